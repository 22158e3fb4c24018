use crate::view::PageView;
use std::collections::BTreeMap;

pub const SHEET_WIDTH_PX: f32 = 794.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub width_px: f32,
    pub views: Vec<PageView>,
}

#[derive(Debug, Default)]
pub struct Stage {
    next_id: u64,
    mounted: BTreeMap<u64, Container>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    pub fn mount(&mut self, views: Vec<PageView>) -> Mounted<'_> {
        let id = self.next_id;
        self.next_id += 1;
        self.mounted.insert(
            id,
            Container {
                width_px: SHEET_WIDTH_PX,
                views,
            },
        );
        log::debug!("mounted offscreen container {id}");
        Mounted { stage: self, id }
    }
}

/// A mounted container. Dropping it unmounts, so error returns release it too.
pub struct Mounted<'a> {
    stage: &'a mut Stage,
    id: u64,
}

impl Mounted<'_> {
    pub fn container(&self) -> Option<&Container> {
        self.stage.mounted.get(&self.id)
    }

    pub fn views(&self) -> &[PageView] {
        self.container().map(|c| c.views.as_slice()).unwrap_or(&[])
    }
}

impl Drop for Mounted<'_> {
    fn drop(&mut self) {
        self.stage.mounted.remove(&self.id);
        log::debug!("released offscreen container {}", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_releases_on_drop() {
        let mut stage = Stage::new();
        {
            let mounted = stage.mount(Vec::new());
            assert_eq!(mounted.container().unwrap().width_px, SHEET_WIDTH_PX);
        }
        assert_eq!(stage.mounted_count(), 0);
    }

    #[test]
    fn guard_releases_on_early_return() {
        fn fails(stage: &mut Stage) -> Result<(), String> {
            let _mounted = stage.mount(Vec::new());
            Err("boom".into())
        }
        let mut stage = Stage::new();
        assert!(fails(&mut stage).is_err());
        assert_eq!(stage.mounted_count(), 0);
    }
}
