use crate::canvas::Canvas;
use crate::flowable::{BreakInside, Flowable};
use crate::types::{Pt, Rect};

pub enum AddResult {
    Placed,
    Split(Box<dyn Flowable>),
    Overflow(Box<dyn Flowable>),
}

pub struct Frame {
    rect: Rect,
    cursor_y: Pt,
}

impl Frame {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            cursor_y: Pt::ZERO,
        }
    }

    pub fn remaining_height(&self) -> Pt {
        (self.rect.height - self.cursor_y).max(Pt::ZERO)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn is_empty(&self) -> bool {
        self.cursor_y <= Pt::ZERO
    }

    fn place(&mut self, flowable: &dyn Flowable, canvas: &mut Canvas, height: Pt) {
        let top = self.rect.y + self.cursor_y;
        flowable.draw(
            canvas,
            self.rect.x,
            top,
            self.rect.width,
            self.remaining_height(),
        );
        self.cursor_y += height;
    }

    pub fn add(&mut self, flowable: Box<dyn Flowable>, canvas: &mut Canvas) -> AddResult {
        let avail_width = self.rect.width;
        let avail_height = self.remaining_height();
        let size = flowable.wrap(avail_width, avail_height);

        if size.height <= avail_height {
            self.place(flowable.as_ref(), canvas, size.height);
            return AddResult::Placed;
        }

        let avoid = flowable.pagination().break_inside == BreakInside::Avoid;
        if avoid && size.height <= self.rect.height && !self.is_empty() {
            return AddResult::Overflow(flowable);
        }

        if let Some((first, second)) = flowable.split(avail_width, avail_height) {
            let first_size = first.wrap(avail_width, avail_height);
            if first_size.height > Pt::ZERO && first_size.height <= avail_height {
                self.place(first.as_ref(), canvas, first_size.height);
                return AddResult::Split(second);
            }
        }

        // Taller than a whole frame and unsplittable: place it anyway and let it clip.
        if self.is_empty() {
            self.place(flowable.as_ref(), canvas, avail_height);
            self.cursor_y = self.rect.height;
            return AddResult::Placed;
        }

        AddResult::Overflow(flowable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flowable::Spacer;
    use crate::types::Size;

    fn frame() -> Frame {
        Frame::new(Rect {
            x: Pt::from_f32(10.0),
            y: Pt::from_f32(10.0),
            width: Pt::from_f32(100.0),
            height: Pt::from_f32(50.0),
        })
    }

    #[test]
    fn fills_until_the_frame_runs_out() {
        let mut canvas = Canvas::new(Size::a4());
        let mut frame = frame();
        assert!(matches!(
            frame.add(Box::new(Spacer::new(Pt::from_f32(30.0))), &mut canvas),
            AddResult::Placed
        ));
        assert_eq!(frame.remaining_height(), Pt::from_f32(20.0));
        assert!(matches!(
            frame.add(Box::new(Spacer::new(Pt::from_f32(30.0))), &mut canvas),
            AddResult::Placed
        ));
        assert_eq!(frame.remaining_height(), Pt::ZERO);
        assert!(canvas.is_current_empty());
    }
}
