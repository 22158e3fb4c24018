use crate::error::{QuoteDocError, Result};
use crate::model::{Document, PAGE_COUNT, Page, is_valid_page};
use crate::store::TemplateStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    PrevPage,
    NextPage,
    SelectPage(u32),
    ToggleEdit,
    EditItem {
        page: u32,
        index: usize,
        text: String,
    },
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    document: Document,
    editing: bool,
    current_page: u32,
}

impl EditorSession {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            editing: false,
            current_page: 1,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn editing(&self) -> bool {
        self.editing
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn current_view(&self) -> (u32, Option<&Page>) {
        (self.current_page, self.document.page(self.current_page))
    }

    pub fn toggle_edit(&mut self) {
        self.editing = !self.editing;
    }

    pub fn try_update_item_text(
        &mut self,
        page: u32,
        index: usize,
        text: impl Into<String>,
    ) -> Result<()> {
        let item = self
            .document
            .item_mut(page, index)
            .ok_or(QuoteDocError::ItemOutOfRange { page, index })?;
        item.set_text(text.into());
        Ok(())
    }

    /// Out-of-range targets are ignored so a stale edit never breaks rendering.
    pub fn update_item_text(&mut self, page: u32, index: usize, text: impl Into<String>) {
        if let Err(err) = self.try_update_item_text(page, index, text) {
            log::debug!("ignored edit: {err}");
        }
    }

    pub fn go_to_page(&mut self, page: u32) {
        if is_valid_page(page) {
            self.current_page = page;
        } else {
            log::debug!("ignored navigation to page {page}");
        }
    }

    pub fn next(&mut self) {
        if self.current_page < PAGE_COUNT {
            self.go_to_page(self.current_page + 1);
        }
    }

    pub fn prev(&mut self) {
        if self.current_page > 1 {
            self.go_to_page(self.current_page - 1);
        }
    }

    pub fn apply(&mut self, action: EditorAction) {
        match action {
            EditorAction::PrevPage => self.prev(),
            EditorAction::NextPage => self.next(),
            EditorAction::SelectPage(page) => self.go_to_page(page),
            EditorAction::ToggleEdit => self.toggle_edit(),
            EditorAction::EditItem { page, index, text } => {
                self.update_item_text(page, index, text)
            }
        }
    }

    /// Persists the document and leaves edit mode. On failure nothing changes.
    pub fn save(&mut self, store: &mut dyn TemplateStore) -> Result<()> {
        store.persist(&self.document)?;
        self.editing = false;
        log::info!("template saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    struct FailingStore;

    impl TemplateStore for FailingStore {
        fn persist(&mut self, _document: &Document) -> Result<()> {
            Err(QuoteDocError::Persist("backend unavailable".to_string()))
        }
    }

    fn session() -> EditorSession {
        EditorSession::new(Document::standard_template())
    }

    #[test]
    fn starts_on_first_page_read_only() {
        let s = session();
        assert_eq!(s.current_page(), 1);
        assert!(!s.editing());
    }

    #[test]
    fn go_to_page_accepts_only_valid_numbers() {
        let mut s = session();
        for page in 1..=PAGE_COUNT {
            s.go_to_page(page);
            assert_eq!(s.current_page(), page);
        }
        s.go_to_page(0);
        assert_eq!(s.current_page(), PAGE_COUNT);
        s.go_to_page(15);
        assert_eq!(s.current_page(), PAGE_COUNT);
    }

    #[test]
    fn navigation_stops_at_bounds() {
        let mut s = session();
        s.prev();
        assert_eq!(s.current_page(), 1);
        s.next();
        assert_eq!(s.current_page(), 2);
        s.go_to_page(PAGE_COUNT);
        s.next();
        assert_eq!(s.current_page(), PAGE_COUNT);
        s.prev();
        assert_eq!(s.current_page(), PAGE_COUNT - 1);
    }

    #[test]
    fn update_changes_only_the_target_text() {
        let mut s = session();
        let before = s.document().clone();
        s.update_item_text(2, 6, "£1.00\t£1.20");
        let item = s.document().item(2, 6).unwrap();
        assert_eq!(item.text(), "£1.00\t£1.20");
        let original = before.item(2, 6).unwrap();
        assert_eq!(item.kind(), original.kind());
        assert_eq!(item.bold(), original.bold());
        assert_eq!(item.italic(), original.italic());
        for (number, page) in before.pages() {
            for (index, old) in page.content().iter().enumerate() {
                if (number, index) == (2, 6) {
                    continue;
                }
                assert_eq!(s.document().item(number, index), Some(old));
            }
        }
    }

    #[test]
    fn out_of_range_edit_is_a_checked_noop() {
        let mut s = session();
        let before = s.document().clone();
        let err = s.try_update_item_text(3, 99, "x").unwrap_err();
        assert!(matches!(
            err,
            QuoteDocError::ItemOutOfRange { page: 3, index: 99 }
        ));
        s.update_item_text(0, 0, "x");
        s.update_item_text(15, 0, "x");
        assert_eq!(s.document(), &before);
    }

    #[test]
    fn toggling_twice_keeps_edits() {
        let mut s = session();
        s.toggle_edit();
        s.update_item_text(1, 12, "Dear Mahad");
        s.toggle_edit();
        assert!(!s.editing());
        assert_eq!(s.document().item(1, 12).unwrap().text(), "Dear Mahad");
    }

    #[test]
    fn last_write_wins() {
        let mut s = session();
        s.apply(EditorAction::EditItem {
            page: 4,
            index: 1,
            text: "first".into(),
        });
        s.apply(EditorAction::EditItem {
            page: 4,
            index: 1,
            text: "second".into(),
        });
        assert_eq!(s.document().item(4, 1).unwrap().text(), "second");
    }

    #[test]
    fn actions_drive_navigation_and_mode() {
        let mut s = session();
        s.apply(EditorAction::SelectPage(7));
        s.apply(EditorAction::NextPage);
        s.apply(EditorAction::ToggleEdit);
        assert_eq!(s.current_page(), 8);
        assert!(s.editing());
        s.apply(EditorAction::PrevPage);
        assert_eq!(s.current_page(), 7);
        assert_eq!(s.current_view().1.unwrap().title, "Your Responsibilities");
    }

    #[test]
    fn save_leaves_edit_mode_and_hands_over_document() {
        let mut s = session();
        let mut store = MemoryStore::default();
        s.toggle_edit();
        s.update_item_text(14, 5, "Valid for 30 days.");
        s.save(&mut store).unwrap();
        assert!(!s.editing());
        let saved = store.last().unwrap();
        assert_eq!(saved.item(14, 5).unwrap().text(), "Valid for 30 days.");
    }

    #[test]
    fn failed_save_preserves_edit_state() {
        let mut s = session();
        s.toggle_edit();
        s.update_item_text(14, 5, "unsaved work");
        let err = s.save(&mut FailingStore).unwrap_err();
        assert!(matches!(err, QuoteDocError::Persist(_)));
        assert!(s.editing());
        assert_eq!(s.document().item(14, 5).unwrap().text(), "unsaved work");
    }
}
