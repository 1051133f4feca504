//! Gantt Layout
//!
//! Steps are laid end to end on a session axis: step `i` starts where the
//! sessions of all earlier steps end.

use crate::models::Step;

/// Pixels per session unit
pub const UNIT_PX: u32 = 32;
/// Width of the step label column
pub const LABEL_PX: u32 = 90;
/// Most labels the session axis shows; longer plans label every n-th session
pub const MAX_TICKS: u32 = 100;

pub const COMPLETE_COLOR: &str = "#48bb78";
pub const INCOMPLETE_COLOR: &str = "#f56565";

pub fn bar_color(is_complete: bool) -> &'static str {
    if is_complete {
        COMPLETE_COLOR
    } else {
        INCOMPLETE_COLOR
    }
}

/// `cum[0] = 0, cum[i + 1] = cum[i] + steps[i].estimated_sessions`,
/// saturating at `u32::MAX`
pub fn cumulative_offsets(steps: &[Step]) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(steps.len() + 1);
    offsets.push(0);
    let mut total = 0u32;
    for step in steps {
        total = total.saturating_add(step.estimated_sessions);
        offsets.push(total);
    }
    offsets
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bar {
    pub index: usize,
    pub step_id: u32,
    /// First session unit
    pub start: u32,
    /// Number of session units
    pub span: u32,
    pub is_complete: bool,
}

impl Bar {
    pub fn left_px(&self) -> u32 {
        self.start.saturating_mul(UNIT_PX)
    }

    pub fn width_px(&self) -> u32 {
        self.span.saturating_mul(UNIT_PX)
    }

    pub fn color(&self) -> &'static str {
        bar_color(self.is_complete)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GanttLayout {
    pub offsets: Vec<u32>,
    pub bars: Vec<Bar>,
}

impl GanttLayout {
    pub fn new(steps: &[Step]) -> Self {
        let offsets = cumulative_offsets(steps);
        let bars = steps
            .iter()
            .enumerate()
            .map(|(index, step)| Bar {
                index,
                step_id: step.id,
                start: offsets[index],
                span: step.estimated_sessions,
                is_complete: step.is_complete,
            })
            .collect();
        Self { offsets, bars }
    }

    /// Total width in session units
    pub fn total(&self) -> u32 {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Sessions covered by one axis label
    pub fn tick_every(&self) -> u32 {
        self.total().div_ceil(MAX_TICKS).max(1)
    }

    pub fn tick_width_px(&self) -> u32 {
        self.tick_every().saturating_mul(UNIT_PX)
    }

    /// Axis labels: every session, or every `tick_every()`-th one on long plans
    pub fn axis(&self) -> impl Iterator<Item = u32> {
        (1..=self.total()).step_by(self.tick_every() as usize)
    }

    pub fn width_px(&self) -> u32 {
        self.total().saturating_mul(UNIT_PX)
    }

    /// Left edge of the note markers under step `index`
    pub fn marker_left_px(&self, index: usize) -> u32 {
        self.offsets
            .get(index)
            .copied()
            .unwrap_or(0)
            .saturating_mul(UNIT_PX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: u32, sessions: u32, is_complete: bool) -> Step {
        Step {
            id,
            name: format!("Step {}", id),
            description: None,
            order: id,
            estimated_sessions: sessions,
            is_complete,
        }
    }

    #[test]
    fn test_offsets_and_total() {
        let steps = vec![step(1, 3, true), step(2, 2, false), step(3, 4, false)];
        let layout = GanttLayout::new(&steps);

        assert_eq!(layout.offsets, vec![0, 3, 5, 9]);
        assert_eq!(layout.total(), 9);
        assert_eq!(layout.axis().collect::<Vec<_>>(), (1..=9).collect::<Vec<_>>());
        assert_eq!(layout.bars[1].start, 3);
        assert_eq!(layout.bars[1].span, 2);
        assert_eq!(layout.bars[2].left_px(), 5 * UNIT_PX);
        assert_eq!(layout.marker_left_px(2), 160);
    }

    #[test]
    fn test_bar_color_is_two_valued() {
        let layout = GanttLayout::new(&[step(1, 1, true), step(2, 1, false)]);
        assert_eq!(layout.bars[0].color(), COMPLETE_COLOR);
        assert_eq!(layout.bars[1].color(), INCOMPLETE_COLOR);
    }

    #[test]
    fn test_empty_plan() {
        let layout = GanttLayout::new(&[]);
        assert_eq!(layout.offsets, vec![0]);
        assert_eq!(layout.total(), 0);
        assert_eq!(layout.axis().count(), 0);
        assert_eq!(layout.tick_every(), 1);
    }

    #[test]
    fn test_long_plan_thins_axis() {
        let layout = GanttLayout::new(&[step(1, 150, false), step(2, 100, false)]);
        assert_eq!(layout.total(), 250);
        assert_eq!(layout.tick_every(), 3);
        assert_eq!(layout.tick_width_px(), 3 * UNIT_PX);
        let ticks: Vec<u32> = layout.axis().collect();
        assert_eq!(ticks.len(), 84);
        assert_eq!(&ticks[..3], &[1, 4, 7]);
    }

    #[test]
    fn test_huge_estimates_saturate() {
        let layout = GanttLayout::new(&[step(1, 200_000_000, false)]);
        assert_eq!(layout.total(), 200_000_000);
        assert_eq!(layout.width_px(), u32::MAX);
        assert_eq!(layout.bars[0].width_px(), u32::MAX);
        assert!(layout.axis().count() <= MAX_TICKS as usize);

        let layout = GanttLayout::new(&[step(1, 3_000_000_000, false), step(2, 3_000_000_000, true)]);
        assert_eq!(layout.offsets, vec![0, 3_000_000_000, u32::MAX]);
        assert_eq!(layout.bars[1].left_px(), u32::MAX);
        assert_eq!(layout.marker_left_px(1), u32::MAX);
        assert!(layout.axis().count() <= MAX_TICKS as usize);
    }
}
