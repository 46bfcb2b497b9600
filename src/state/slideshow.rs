//! Slideshow position state for one open region.

use log::warn;

/// Direction for moving through slides.
#[derive(Debug, Clone, Copy)]
enum Direction {
    Next,
    Previous,
}

/// Tracks the current slide index within a region's ordered slide list.
#[derive(Debug, Clone)]
pub struct SlideshowState {
    total: usize,
    current: usize,
}

impl SlideshowState {
    /// Creates a slideshow positioned on the first slide.
    pub fn new(total: usize) -> Self {
        Self { total, current: 0 }
    }

    fn step(&mut self, direction: Direction) -> Option<usize> {
        if self.total == 0 {
            warn!("No slides available for navigation");
            return None;
        }

        match direction {
            Direction::Next => {
                if self.current + 1 < self.total {
                    self.current += 1;
                } else {
                    return None;
                }
            }
            Direction::Previous => {
                if self.current > 0 {
                    self.current -= 1;
                } else {
                    return None;
                }
            }
        }

        Some(self.current)
    }

    /// Advances to the next slide, staying put at the end.
    pub fn next_slide(&mut self) -> Option<usize> {
        self.step(Direction::Next)
    }

    /// Moves to the previous slide, staying put at the start.
    pub fn prev_slide(&mut self) -> Option<usize> {
        self.step(Direction::Previous)
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn at_first(&self) -> bool {
        self.current == 0
    }

    pub fn at_last(&self) -> bool {
        self.total == 0 || self.current == self.total - 1
    }

    /// Counter caption, 1-based: `"3 / 12"`.
    pub fn counter_label(&self) -> String {
        format!("{} / {}", self.current + 1, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_and_prev_clamp_at_boundaries() {
        let mut show = SlideshowState::new(3);
        assert!(show.at_first());
        assert_eq!(show.prev_slide(), None);

        assert_eq!(show.next_slide(), Some(1));
        assert_eq!(show.next_slide(), Some(2));
        assert!(show.at_last());
        assert_eq!(show.next_slide(), None);
        assert_eq!(show.current(), 2);

        assert_eq!(show.prev_slide(), Some(1));
    }

    #[test]
    fn counter_label_is_one_based() {
        let mut show = SlideshowState::new(12);
        show.next_slide();
        show.next_slide();
        assert_eq!(show.counter_label(), "3 / 12");
    }

    #[test]
    fn empty_slideshow_never_moves() {
        let mut show = SlideshowState::new(0);
        assert_eq!(show.next_slide(), None);
        assert_eq!(show.prev_slide(), None);
    }
}
