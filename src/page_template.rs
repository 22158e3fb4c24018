use crate::canvas::Canvas;
use crate::frame::Frame;
use crate::types::{Margins, Rect, Size};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct PageContext {
    pub page_number: usize,
    pub template_name: String,
}

pub type OnPageCallback = Arc<dyn Fn(&mut Canvas, &PageContext) + Send + Sync>;

#[derive(Clone)]
pub struct PageTemplate {
    pub name: String,
    pub page_size: Size,
    frames: Vec<Rect>,
    on_page: Option<OnPageCallback>,
}

impl PageTemplate {
    pub fn new(name: impl Into<String>, page_size: Size) -> Self {
        Self {
            name: name.into(),
            page_size,
            frames: Vec::new(),
            on_page: None,
        }
    }

    pub fn single_frame(name: impl Into<String>, page_size: Size, margins: Margins) -> Self {
        Self::new(name, page_size).with_frame(margins.content_rect(page_size))
    }

    pub fn with_frame(mut self, rect: Rect) -> Self {
        self.frames.push(rect);
        self
    }

    pub fn set_on_page<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Canvas, &PageContext) + Send + Sync + 'static,
    {
        self.on_page = Some(Arc::new(callback));
        self
    }

    pub fn on_page(&self) -> Option<&OnPageCallback> {
        self.on_page.as_ref()
    }

    pub fn frame_rects(&self) -> &[Rect] {
        &self.frames
    }

    pub fn instantiate_frames(&self) -> Vec<Frame> {
        self.frames.iter().map(|rect| Frame::new(*rect)).collect()
    }
}
