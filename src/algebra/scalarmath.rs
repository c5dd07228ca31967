use super::{FloatT, ScalarMath};

impl<T: FloatT> ScalarMath for T {
    type T = T;
    fn clip(&self, lo: T, hi: T) -> T {
        if *self < lo {
            lo
        } else if *self > hi {
            hi
        } else {
            *self
        }
    }
}
