use particle_physics::LayoutError;
use std::sync::mpsc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    /// Store or dispatch violates the grid layout contract
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Waiting on the device failed during readback
    #[error("device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),

    /// Mapping the staging buffer failed
    #[error("staging buffer map failed: {0}")]
    Map(#[from] wgpu::BufferAsyncError),

    /// The map callback was dropped without reporting a result
    #[error("staging buffer map never completed: {0}")]
    MapAbandoned(#[from] mpsc::RecvError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use particle_physics::GridDims;

    #[test]
    fn dropped_map_callback_is_an_error() {
        let (sender, receiver) = mpsc::channel::<Result<(), wgpu::BufferAsyncError>>();
        drop(sender);
        let err: SimulationError = receiver.recv().unwrap_err().into();
        assert!(matches!(err, SimulationError::MapAbandoned(_)));
    }

    #[test]
    fn layout_errors_keep_their_message() {
        let expected = GridDims::new(2, 4, 1).unwrap();
        let found = GridDims::new(4, 2, 1).unwrap();
        let err = SimulationError::from(LayoutError::DimsMismatch { expected, found });
        assert_eq!(
            err.to_string(),
            "layout error: expected a 2x4x1 grid but got 4x2x1"
        );
    }
}
