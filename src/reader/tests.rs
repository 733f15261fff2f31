use super::*;
use crate::cache::{MemorySessionStore, PersistedSession};
use crate::classifier::{ListItemRule, ParagraphKind};
use crate::content::Chapter;
use crate::session::{MAX_FONT_SIZE, MIN_FONT_SIZE};
use std::time::Duration;

const DEBOUNCE: Duration = Duration::from_millis(500);
const RESTORE: Duration = Duration::from_millis(100);

fn build_book(chapters: usize) -> Arc<Book> {
    let chapters = (0..chapters)
        .map(|i| Chapter {
            title: format!("Capítulo de teste {i}"),
            content: format!(
                "No princípio era o verbo, capítulo {i}.\n\nA PARTE DE DEUS\n\n- Dê o dízimo, sempre.\n\nHonra ao Senhor com teus bens. (Provérbios 3:9)"
            ),
        })
        .collect();
    Arc::new(Book::new("Finanças", chapters).unwrap())
}

fn options() -> ReaderOptions {
    ReaderOptions {
        save_debounce: DEBOUNCE,
        restore_delay: RESTORE,
        ..ReaderOptions::default()
    }
}

fn mount(store: &MemorySessionStore, now: Instant) -> ReaderController<MemorySessionStore> {
    ReaderController::mount(build_book(4), store.clone(), options(), now)
}

fn saved(store: &MemorySessionStore) -> Option<PersistedSession> {
    store.contents().and_then(|c| PersistedSession::parse(&c))
}

fn store_with(session: PersistedSession) -> MemorySessionStore {
    MemorySessionStore::with_contents(serde_json::to_string(&session).unwrap())
}

#[test]
fn fresh_mount_is_active_with_defaults() {
    let store = MemorySessionStore::new();
    let reader = mount(&store, Instant::now());

    assert_eq!(reader.phase(), ReaderPhase::Active);
    assert_eq!(reader.session().chapter_index(), 0);
    assert_eq!(reader.session().theme(), ThemeId::Dark);
    assert_eq!(reader.session().font_size(), 18);
    assert!(reader.restore_token().is_none());
}

#[test]
fn restore_adopts_preferences_then_applies_scroll_after_layout() {
    let store = store_with(PersistedSession {
        chapter_index: 2,
        scroll_top: 640.0,
        theme: ThemeId::Sepia,
        font_size: 24,
    });
    let start = Instant::now();
    let mut reader = mount(&store, start);

    assert_eq!(reader.phase(), ReaderPhase::Restoring);
    assert_eq!(reader.session().chapter_index(), 2);
    assert_eq!(reader.session().theme(), ThemeId::Sepia);
    assert_eq!(reader.session().font_size(), 24);
    assert_eq!(reader.session().scroll_offset(), 0.0);

    // layout noise while restoring must not schedule a save
    reader.scrolled(0.0, 3000.0, 800.0, start + Duration::from_millis(10));
    reader.set_theme(ThemeId::Light, start + Duration::from_millis(20));
    assert!(!reader.has_pending_save());
    assert!(reader.tick(start + Duration::from_millis(50)).is_empty());
    assert_eq!(reader.phase(), ReaderPhase::Restoring);

    let effects = reader.tick(start + RESTORE);
    assert_eq!(effects, vec![Effect::ScrollTo(640.0)]);
    assert_eq!(reader.phase(), ReaderPhase::Active);
    assert_eq!(reader.session().scroll_offset(), 640.0);
    assert_eq!(store.writes(), 0);

    reader.tick(start + RESTORE + DEBOUNCE);
    assert_eq!(store.writes(), 1);
    let written = saved(&store).unwrap();
    assert_eq!(written.chapter_index, 2);
    assert_eq!(written.scroll_top, 640.0);
    assert_eq!(written.theme, ThemeId::Light);
}

#[test]
fn malformed_saved_session_falls_back_to_defaults() {
    let store = MemorySessionStore::with_contents("{\"chapterIndex\": ");
    let reader = mount(&store, Instant::now());

    assert_eq!(reader.phase(), ReaderPhase::Active);
    assert_eq!(reader.session().chapter_index(), 0);
    assert_eq!(reader.session().theme(), ThemeId::Dark);
    assert_eq!(reader.session().font_size(), 18);
}

#[test]
fn saved_chapter_beyond_the_book_is_clamped() {
    let store = store_with(PersistedSession {
        chapter_index: 99,
        ..PersistedSession::default()
    });
    let reader = mount(&store, Instant::now());
    assert_eq!(reader.session().chapter_index(), 3);
}

#[test]
fn go_to_chapter_is_idempotent_and_rewinds_every_call() {
    let store = MemorySessionStore::new();
    let now = Instant::now();
    let mut reader = mount(&store, now);
    reader.update(ReaderMessage::ToggleChapterList, now);
    reader.scrolled(500.0, 2000.0, 500.0, now);

    let first = reader.go_to_chapter(2, now);
    let state_after_first = reader.session().clone();
    let second = reader.go_to_chapter(2, now);

    assert_eq!(first, vec![Effect::ScrollTo(0.0)]);
    assert_eq!(second, vec![Effect::ScrollTo(0.0)]);
    assert_eq!(reader.session(), &state_after_first);
    assert_eq!(reader.session().chapter_index(), 2);
    assert_eq!(reader.session().scroll_offset(), 0.0);
    assert_eq!(reader.session().progress(), 0.0);
    assert!(!reader.is_chapter_list_open());
}

#[test]
fn chapter_navigation_never_leaves_the_book() {
    let store = MemorySessionStore::new();
    let now = Instant::now();
    let mut reader = mount(&store, now);

    assert!(reader.update(ReaderMessage::PreviousChapter, now).is_empty());
    assert_eq!(reader.session().chapter_index(), 0);

    reader.go_to_chapter(usize::MAX, now);
    assert_eq!(reader.session().chapter_index(), 3);
    assert!(reader.update(ReaderMessage::NextChapter, now).is_empty());
    assert_eq!(reader.session().chapter_index(), 3);

    reader.update(ReaderMessage::PreviousChapter, now);
    assert_eq!(reader.session().chapter_index(), 2);
}

#[test]
fn burst_of_font_changes_is_written_once() {
    let store = MemorySessionStore::new();
    let start = Instant::now();
    let mut reader = mount(&store, start);

    for step in 0..4u64 {
        reader.increase_font(start + Duration::from_millis(step * 100));
        reader.tick(start + Duration::from_millis(step * 100 + 50));
    }
    assert_eq!(store.writes(), 0);

    reader.tick(start + Duration::from_millis(300) + DEBOUNCE);
    assert_eq!(store.writes(), 1);
    assert_eq!(saved(&store).unwrap().font_size, 26);

    reader.tick(start + Duration::from_secs(10));
    assert_eq!(store.writes(), 1);
}

#[test]
fn font_size_stays_within_bounds() {
    let store = MemorySessionStore::new();
    let now = Instant::now();
    let mut reader = mount(&store, now);

    for _ in 0..10 {
        reader.decrease_font(now);
    }
    assert_eq!(reader.session().font_size(), MIN_FONT_SIZE);
    for _ in 0..10 {
        reader.increase_font(now);
    }
    assert_eq!(reader.session().font_size(), MAX_FONT_SIZE);
}

#[test]
fn scroll_progress_is_zero_for_short_content() {
    let store = MemorySessionStore::new();
    let now = Instant::now();
    let mut reader = mount(&store, now);

    reader.scrolled(0.0, 300.0, 800.0, now);
    assert_eq!(reader.snapshot().progress_pct, 0.0);

    reader.scrolled(250.0, 1300.0, 800.0, now);
    assert_eq!(reader.snapshot().progress_pct, 50.0);
}

#[test]
fn close_flushes_pending_save_and_signals_host() {
    let store = MemorySessionStore::new();
    let now = Instant::now();
    let mut reader = mount(&store, now);
    reader.go_to_chapter(1, now);
    reader.scrolled(420.0, 4000.0, 800.0, now);
    assert!(reader.has_pending_save());

    let effects = reader.close();
    assert_eq!(effects, vec![Effect::Close]);
    assert_eq!(reader.phase(), ReaderPhase::Closed);
    assert!(!reader.has_pending_save());
    assert_eq!(store.writes(), 1);
    let written = saved(&store).unwrap();
    assert_eq!(written.chapter_index, 1);
    assert_eq!(written.scroll_top, 420.0);

    assert!(reader.go_to_chapter(3, now).is_empty());
    assert!(reader.close().is_empty());
    drop(reader);
    assert_eq!(store.writes(), 1);
}

#[test]
fn closing_while_restoring_voids_the_pending_scroll() {
    let original = PersistedSession {
        chapter_index: 1,
        scroll_top: 900.0,
        theme: ThemeId::Light,
        font_size: 20,
    };
    let store = store_with(original);
    let start = Instant::now();
    let mut reader = mount(&store, start);
    let token = reader.restore_token().unwrap();

    assert_eq!(reader.close(), vec![Effect::Close]);
    assert!(token.is_cancelled());
    assert!(reader.tick(start + RESTORE * 5).is_empty());
    assert_eq!(store.writes(), 0);
    assert_eq!(saved(&store), Some(original));
}

#[test]
fn remount_restores_what_the_previous_view_flushed() {
    let store = MemorySessionStore::new();
    let start = Instant::now();
    {
        let mut reader = mount(&store, start);
        reader.go_to_chapter(3, start);
        reader.set_theme(ThemeId::Sepia, start);
        reader.scrolled(75.0, 1000.0, 500.0, start);
        // dropped without close
    }
    assert_eq!(store.writes(), 1);

    let mut reader = mount(&store, start + Duration::from_secs(1));
    assert_eq!(reader.phase(), ReaderPhase::Restoring);
    assert_eq!(reader.session().chapter_index(), 3);
    assert_eq!(reader.session().theme(), ThemeId::Sepia);
    let effects = reader.tick(start + Duration::from_secs(1) + RESTORE);
    assert_eq!(effects, vec![Effect::ScrollTo(75.0)]);
}

#[test]
fn chapter_change_during_restore_drops_the_old_offset() {
    let store = store_with(PersistedSession {
        chapter_index: 0,
        scroll_top: 300.0,
        ..PersistedSession::default()
    });
    let start = Instant::now();
    let mut reader = mount(&store, start);
    let token = reader.restore_token().unwrap();

    let effects = reader.go_to_chapter(2, start + Duration::from_millis(10));
    assert_eq!(effects, vec![Effect::ScrollTo(0.0)]);
    assert!(token.is_cancelled());
    assert_eq!(reader.phase(), ReaderPhase::Active);

    assert!(reader.tick(start + RESTORE).is_empty());
    assert_eq!(reader.session().scroll_offset(), 0.0);
    reader.tick(start + Duration::from_millis(10) + DEBOUNCE);
    assert_eq!(saved(&store).unwrap().chapter_index, 2);
}

#[test]
fn storage_failures_do_not_reach_the_reader() {
    let store = MemorySessionStore::new();
    let now = Instant::now();
    let mut reader = mount(&store, now);
    store.set_unavailable(true);

    reader.increase_font(now);
    reader.tick(now + DEBOUNCE);
    assert_eq!(reader.phase(), ReaderPhase::Active);
    assert_eq!(reader.close(), vec![Effect::Close]);
    assert_eq!(store.writes(), 0);
}

#[test]
fn next_deadline_tracks_restore_and_save() {
    let store = store_with(PersistedSession::default());
    let start = Instant::now();
    let mut reader = mount(&store, start);
    assert_eq!(reader.next_deadline(), Some(start + RESTORE));

    reader.tick(start + RESTORE);
    assert_eq!(reader.next_deadline(), Some(start + RESTORE + DEBOUNCE));
    reader.tick(start + RESTORE + DEBOUNCE);
    assert_eq!(reader.next_deadline(), None);
}

#[test]
fn snapshot_describes_the_current_chapter() {
    let store = MemorySessionStore::new();
    let now = Instant::now();
    let mut reader = mount(&store, now);

    let intro = reader.snapshot();
    assert_eq!(intro.chapter_label, "Introdução");
    assert_eq!(intro.position_label, "1 / 4");
    assert!(!intro.has_previous);
    assert!(intro.has_next);
    assert_eq!(intro.chapter_list[0].marker, "•");
    assert_eq!(intro.chapter_list[3].marker, "03");
    assert!(intro.chapter_list[0].current);
    assert_eq!(intro.theme_attributes, ThemeId::Dark.attributes());

    let kinds: Vec<ParagraphKind> = intro.blocks.iter().map(|b| b.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ParagraphKind::FirstBodyParagraph,
            ParagraphKind::Heading,
            ParagraphKind::ListItem,
            ParagraphKind::ScriptureQuote,
        ]
    );

    reader.go_to_chapter(2, now);
    reader.update(ReaderMessage::ToggleSettings, now);
    let chapter = reader.snapshot();
    assert_eq!(chapter.chapter_label, "Capítulo 2");
    assert_eq!(chapter.chapter_title, "Capítulo de teste 2");
    assert!(chapter.settings_open);
    assert!(chapter.chapter_list[2].current);
}

#[test]
fn injected_classifier_changes_rendering() {
    let store = MemorySessionStore::new();
    let reader = mount(&store, Instant::now())
        .with_classifier(Classifier::with_rules(vec![Box::new(ListItemRule)]));
    let kinds: Vec<ParagraphKind> = reader.snapshot().blocks.iter().map(|b| b.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ParagraphKind::BodyParagraph,
            ParagraphKind::BodyParagraph,
            ParagraphKind::ListItem,
            ParagraphKind::BodyParagraph,
        ]
    );
}
