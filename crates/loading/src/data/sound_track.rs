#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SoundMode {
    Mono8,
    #[default]
    Mono16,
    Stereo8,
    Stereo16,
}

impl SoundMode {
    pub fn channels(self) -> u16 {
        match self {
            SoundMode::Mono8 | SoundMode::Mono16 => 1,
            SoundMode::Stereo8 | SoundMode::Stereo16 => 2,
        }
    }

    pub fn bytes_per_sample(self) -> u16 {
        match self {
            SoundMode::Mono8 | SoundMode::Stereo8 => 1,
            SoundMode::Mono16 | SoundMode::Stereo16 => 2,
        }
    }
}

/// Decoded PCM sound.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SoundTrack {
    pub name: String,
    pub mode: SoundMode,
    /// Samples per second.
    pub frequency: u32,
    pub data: Vec<u8>,
}

impl SoundTrack {
    pub fn duration_secs(&self) -> f32 {
        let frame = self.mode.channels() as u32 * self.mode.bytes_per_sample() as u32;
        if self.frequency == 0 || frame == 0 {
            return 0.0;
        }
        self.data.len() as f32 / (frame * self.frequency) as f32
    }
}
