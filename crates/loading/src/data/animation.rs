/// Pose of one joint in a frame, relative to its parent.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct JointPose {
    pub position: [f32; 3],
    pub orientation: [f32; 4],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub joints: Vec<JointPose>,
}

/// Skeletal animation. Each frame must carry as many joints as the bind pose
/// of the model it is applied to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animation {
    pub name: String,
    pub frame_rate: f32,
    pub frames: Vec<Frame>,
}

impl Animation {
    /// Seconds per frame, 0 for a (near) zero frame rate.
    pub fn frame_duration(&self) -> f32 {
        if self.frame_rate < 0.001 {
            return 0.0;
        }
        1.0 / self.frame_rate
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}
