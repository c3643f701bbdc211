/// Frame metadata - carries frame number and virtual clock time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub number: u64,
    pub time: f32,
}

impl FrameInfo {
    pub fn new(number: u64, time: f32) -> Self {
        Self { number, time }
    }
}
