/// Query execution progress.
/// Values are deltas and must be summed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub rows:       u64,
    pub bytes:      u64,
    /// Reported only by servers at revision 51554 or newer; zero otherwise.
    pub total_rows: u64,
}

impl std::ops::Add for Progress {
    type Output = Progress;

    fn add(self, rhs: Self) -> Self::Output {
        Self::Output {
            rows:       self.rows + rhs.rows,
            bytes:      self.bytes + rhs.bytes,
            total_rows: self.total_rows + rhs.total_rows,
        }
    }
}

impl std::ops::AddAssign for Progress {
    fn add_assign(&mut self, rhs: Self) { *self = *self + rhs; }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_sum() {
        let mut total = Progress::default();
        total += Progress { rows: 10, bytes: 80, total_rows: 100 };
        total += Progress { rows: 20, bytes: 160, total_rows: 0 };
        assert_eq!(total, Progress { rows: 30, bytes: 240, total_rows: 100 });
    }
}
