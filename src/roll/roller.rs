use crate::common::UInt;
use rand::Rng;
use std::num::NonZeroU64;

pub trait Roller {
    /// Returns a face in `1..=sides`.
    fn roll(&mut self, sides: NonZeroU64) -> UInt;
}

impl<R: Rng> Roller for R {
    fn roll(&mut self, sides: NonZeroU64) -> UInt {
        self.gen_range(1..=sides.get())
    }
}

#[cfg(test)]
pub(crate) use scripted::{SequenceRoller, StepRoller};

#[cfg(test)]
mod scripted {
    use super::*;
    use std::collections::VecDeque;

    pub(crate) struct StepRoller {
        current: UInt,
        step: UInt,
    }

    impl StepRoller {
        pub fn new(initial: UInt, step: UInt) -> Self {
            Self {
                current: initial,
                step,
            }
        }
    }

    impl Roller for StepRoller {
        fn roll(&mut self, sides: NonZeroU64) -> UInt {
            let ret = (self.current - 1) % sides.get() + 1;
            self.current += self.step;
            ret
        }
    }

    pub(crate) struct SequenceRoller {
        faces: VecDeque<UInt>,
    }

    impl SequenceRoller {
        pub fn new(faces: impl IntoIterator<Item = UInt>) -> Self {
            Self {
                faces: faces.into_iter().collect(),
            }
        }
    }

    impl Roller for SequenceRoller {
        fn roll(&mut self, sides: NonZeroU64) -> UInt {
            let face = self.faces.pop_front().expect("ran out of scripted faces");
            assert!(face <= sides.get(), "scripted face {} on a d{}", face, sides);
            face
        }
    }

    #[test]
    fn test_step_roller_wraps() {
        let mut roller = StepRoller::new(10, 1);
        let d6 = NonZeroU64::new(6).unwrap();
        let faces: Vec<_> = (0..4).map(|_| roller.roll(d6)).collect();
        assert_eq!(vec![4, 5, 6, 1], faces);
    }
}
