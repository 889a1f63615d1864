use rusqlite::Connection;
use seendeck_core::db::open_db_in_memory;
use seendeck_core::{
    run_empty_decks_action, Card, CardFilter, CardId, CardQueue, CardRepository, Count, DeckId,
    DeckRepository, HostUi, ManualClock, MenuCommand, MenuRegistry, RepoResult, ReportConfig,
    ReportError, ReportService, SqliteCardRepository, SqliteDeckRepository, DEFAULT_DECK_ID,
    EMPTY_DECKS_ACTION_ID, REPORT_HEADER,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Default)]
struct RecordingUi {
    warnings: RefCell<Vec<String>>,
}

impl HostUi for RecordingUi {
    fn show_warning(&self, message: &str) {
        self.warnings.borrow_mut().push(message.to_string());
    }
}

/// Card store that tallies count queries into a shared counter.
struct TallyingCards<'conn> {
    inner: SqliteCardRepository<'conn>,
    queries: Rc<Cell<usize>>,
}

impl CardRepository for TallyingCards<'_> {
    fn add_card(
        &self,
        deck_id: DeckId,
        original_deck_id: Option<DeckId>,
        queue: CardQueue,
    ) -> RepoResult<Card> {
        self.inner.add_card(deck_id, original_deck_id, queue)
    }

    fn get_card(&self, id: CardId) -> RepoResult<Option<Card>> {
        self.inner.get_card(id)
    }

    fn set_queue(&self, id: CardId, queue: CardQueue) -> RepoResult<()> {
        self.inner.set_queue(id, queue)
    }

    fn count_cards(&self, deck_id: DeckId, filter: CardFilter) -> RepoResult<Option<Count>> {
        self.queries.set(self.queries.get() + 1);
        self.inner.count_cards(deck_id, filter)
    }
}

fn deck(conn: &Connection, name: &str) -> DeckId {
    SqliteDeckRepository::new(conn).create_deck(name).unwrap().id
}

fn add_unseen(conn: &Connection, deck_id: DeckId, count: usize) {
    let cards = SqliteCardRepository::new(conn);
    for _ in 0..count {
        cards.add_card(deck_id, None, CardQueue::New).unwrap();
    }
}

fn report_names(conn: &Connection) -> Vec<String> {
    let mut service = ReportService::new(
        SqliteDeckRepository::new(conn),
        SqliteCardRepository::new(conn),
        ManualClock::new(1_000),
    );
    service.build_report().unwrap().deck_names
}

#[test]
fn empty_children_of_non_empty_parent_are_reported() {
    let conn = open_db_in_memory().unwrap();
    let a = deck(&conn, "A");
    deck(&conn, "A::B");
    deck(&conn, "A::C");
    add_unseen(&conn, a, 2);

    assert_eq!(report_names(&conn), vec!["A::B", "A::C"]);
}

#[test]
fn fully_empty_branch_reports_only_its_top() {
    let conn = open_db_in_memory().unwrap();
    deck(&conn, "A::B");
    deck(&conn, "A::C");

    assert_eq!(report_names(&conn), vec!["A"]);
}

#[test]
fn empty_chain_surfaces_topmost_deck_only() {
    let conn = open_db_in_memory().unwrap();
    let root = deck(&conn, "Root");
    deck(&conn, "Root::A::B::C");
    add_unseen(&conn, root, 1);

    assert_eq!(report_names(&conn), vec!["Root::A"]);
}

#[test]
fn decks_with_unseen_descendants_are_never_reported() {
    let conn = open_db_in_memory().unwrap();
    deck(&conn, "Busy");
    let leaf = deck(&conn, "Busy::Inner::Leaf");
    add_unseen(&conn, leaf, 1);
    let seen = deck(&conn, "Seen");
    SqliteCardRepository::new(&conn)
        .add_card(seen, None, CardQueue::Review)
        .unwrap();

    assert_eq!(report_names(&conn), vec!["Seen"]);
}

#[test]
fn report_is_sorted_and_excludes_default_deck() {
    let conn = open_db_in_memory().unwrap();
    deck(&conn, "zeta");
    deck(&conn, "Beta");
    deck(&conn, "Alpha");

    assert_eq!(report_names(&conn), vec!["Alpha", "Beta", "zeta"]);
}

#[test]
fn excluded_decks_are_configurable() {
    let conn = open_db_in_memory().unwrap();
    let hidden = deck(&conn, "Hidden");

    let mut service = ReportService::with_config(
        SqliteDeckRepository::new(&conn),
        SqliteCardRepository::new(&conn),
        ManualClock::new(5),
        ReportConfig {
            excluded_deck_ids: vec![hidden],
        },
    );
    let report = service.build_report().unwrap();

    assert_eq!(report.deck_names, vec!["Default"]);
    assert!(!service.config().is_excluded(DEFAULT_DECK_ID));
}

#[test]
fn later_pass_picks_up_card_changes() {
    let conn = open_db_in_memory().unwrap();
    let a = deck(&conn, "A");
    let cards = SqliteCardRepository::new(&conn);
    let card = cards.add_card(a, None, CardQueue::New).unwrap();
    let clock = ManualClock::new(100);

    let mut service = ReportService::new(
        SqliteDeckRepository::new(&conn),
        SqliteCardRepository::new(&conn),
        &clock,
    );
    assert!(service.build_report().unwrap().is_empty());

    cards.set_queue(card.id, CardQueue::Review).unwrap();
    assert!(service.build_report().unwrap().is_empty());

    clock.advance(1);
    let report = service.build_report().unwrap();
    assert_eq!(report.reference_time, 101);
    assert_eq!(report.deck_names, vec!["A"]);
}

#[test]
fn render_joins_names_under_header() {
    let conn = open_db_in_memory().unwrap();
    deck(&conn, "A");
    deck(&conn, "B");

    let mut service = ReportService::new(
        SqliteDeckRepository::new(&conn),
        SqliteCardRepository::new(&conn),
        ManualClock::new(1),
    );
    let rendered = service.build_report().unwrap().render();

    assert_eq!(rendered, format!("{REPORT_HEADER}\nA\nB"));
}

#[test]
fn menu_action_shows_report_in_host_ui() {
    let conn = open_db_in_memory().unwrap();
    let a = deck(&conn, "A");
    deck(&conn, "A::Done");
    add_unseen(&conn, a, 1);

    let mut registry = MenuRegistry::new();
    registry.register_empty_decks().unwrap();
    assert_eq!(
        registry.resolve(EMPTY_DECKS_ACTION_ID).unwrap(),
        MenuCommand::EmptyDecksReport
    );

    let mut service = ReportService::new(
        SqliteDeckRepository::new(&conn),
        SqliteCardRepository::new(&conn),
        ManualClock::new(1),
    );
    let ui = RecordingUi::default();
    let report = run_empty_decks_action(&mut service, &ui).unwrap();

    assert_eq!(report.deck_names, vec!["A::Done"]);
    assert_eq!(
        ui.warnings.borrow().as_slice(),
        &[format!("{REPORT_HEADER}\nA::Done")]
    );
}

#[test]
fn report_serializes_to_json() {
    let conn = open_db_in_memory().unwrap();
    deck(&conn, "Only");

    let mut service = ReportService::new(
        SqliteDeckRepository::new(&conn),
        SqliteCardRepository::new(&conn),
        ManualClock::new(7),
    );
    let report = service.build_report().unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(
        json,
        serde_json::json!({ "reference_time": 7, "deck_names": ["Only"] })
    );
}

#[test]
fn orphan_deck_without_parent_row_fails_the_pass() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO decks (id, name) VALUES (9, 'Ghost::Child');", [])
        .unwrap();

    let mut service = ReportService::new(
        SqliteDeckRepository::new(&conn),
        SqliteCardRepository::new(&conn),
        ManualClock::new(1),
    );
    let err = service.build_report().unwrap_err();

    assert!(matches!(err, ReportError::ParentNotFound(name) if name == "Ghost"));
}

#[test]
fn repeated_report_at_same_reference_time_does_not_requery() {
    let conn = open_db_in_memory().unwrap();
    let a = deck(&conn, "A");
    deck(&conn, "A::B");
    add_unseen(&conn, a, 1);

    let queries = Rc::new(Cell::new(0));
    let clock = ManualClock::new(50);
    let mut service = ReportService::new(
        SqliteDeckRepository::new(&conn),
        TallyingCards {
            inner: SqliteCardRepository::new(&conn),
            queries: Rc::clone(&queries),
        },
        &clock,
    );

    let first = service.build_report().unwrap();
    let after_first_pass = queries.get();
    assert_eq!(after_first_pass, 2);

    let second = service.build_report().unwrap();
    assert_eq!(queries.get(), after_first_pass);
    assert_eq!(first, second);
    assert_eq!(second.deck_names, vec!["A::B"]);

    clock.advance(1);
    service.build_report().unwrap();
    assert_eq!(queries.get(), after_first_pass * 2);
}
