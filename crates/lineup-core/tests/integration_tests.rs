// Integration tests for the lineup core.
//
// These exercise the full flow through the public API: catalog CSV ->
// codec -> roster builder -> validation -> submission -> store.

use std::fs;
use std::path::{Path, PathBuf};

use lineup_core::catalog::{Catalog, CatalogError};
use lineup_core::codec::{self, clean_name, CodecError, CodecKind, InlineCodec, LabelCodec, LookupCodec};
use lineup_core::config::{self, Config};
use lineup_core::formation::Formation;
use lineup_core::player::{PlayerRecord, Position, Price};
use lineup_core::prediction::{GoalCount, PredictionEntry};
use lineup_core::roster::{self, RosterBuilder, RosterError, RosterSelection, Slot};
use lineup_core::store::{self, CsvStore, SqliteStore, StoreConfig, StoreKind, SubmissionStore};
use lineup_core::submission::{self, LineupEntry, SubmissionContext, SubmitError};
use lineup_core::validate::{Rules, ValidationError};

// ===========================================================================
// Test helpers
// ===========================================================================

/// Fixture directory path (relative to the crate root, which is the cwd for
/// `cargo test`).
const FIXTURES: &str = "tests/fixtures";

fn fixture_catalog() -> Catalog {
    Catalog::load_file(&Path::new(FIXTURES).join("catalog.csv"), b',')
        .expect("fixture catalog should load")
}

/// Workspace root holding `defaults/`.
fn project_root() -> PathBuf {
    let cwd = std::env::current_dir().unwrap();
    for candidate in [cwd.clone(), cwd.join("../.."), cwd.join("..")] {
        if candidate.join("defaults/league.toml").exists() {
            return candidate;
        }
    }
    panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
}

/// Load the shipped default config through a scratch directory.
fn default_config(name: &str) -> Config {
    let tmp = std::env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&tmp);
    fs::create_dir_all(tmp.join("defaults")).unwrap();
    for file in ["league.toml", "storage.toml"] {
        fs::copy(
            project_root().join("defaults").join(file),
            tmp.join("defaults").join(file),
        )
        .unwrap();
    }
    config::ensure_config_files(&tmp).unwrap();
    let config = config::load_config_from(&tmp).unwrap();
    let _ = fs::remove_dir_all(&tmp);
    config
}

fn scratch_csv_store(name: &str) -> CsvStore {
    let dir = std::env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&dir);
    CsvStore::new(&dir.join("entradas.csv"))
}

/// Pick players by name from the fixture catalog through the builder, the
/// way an interactive session would.
fn pick(
    catalog: &Catalog,
    codec: &dyn LabelCodec,
    formation: Formation,
    names: &[(Position, &str)],
) -> RosterSelection {
    let mut builder = RosterBuilder::new(formation);
    let mut next_index = [0usize; 4];
    for &(position, name) in names {
        let label = roster::choices(catalog, codec, position)
            .into_iter()
            .find(|l| l.starts_with(name))
            .unwrap_or_else(|| panic!("{name} not offered for {position}"));
        let counter = &mut next_index[position.sort_order() as usize];
        assert!(builder.choose(Slot { position, index: *counter }, &label));
        *counter += 1;
    }
    builder.build()
}

fn cheap_three_two_one() -> Vec<(Position, &'static str)> {
    vec![
        (Position::Goalkeeper, "Iker Muniain"),
        (Position::Defender, "Ramón Ortega"),
        (Position::Defender, "Dani Vidal"),
        (Position::Defender, "Sergio Peña"),
        (Position::Midfielder, "Lucía Prieto"),
        (Position::Midfielder, "Marta Gil"),
        (Position::Forward, "Hugo Núñez"),
    ]
}

fn rules_without_predictions() -> Rules<'static> {
    Rules {
        budget_cap: Price::from_euros(700),
        predictions: None,
    }
}

// ===========================================================================
// Catalog and codec
// ===========================================================================

#[test]
fn fixture_catalog_skips_bad_rows() {
    let catalog = fixture_catalog();
    assert_eq!(catalog.len(), 12);
    assert_eq!(catalog.by_position(Position::Goalkeeper).count(), 2);
    assert_eq!(catalog.by_position(Position::Defender).count(), 4);
    assert!(catalog.players().iter().all(|p| p.name != "Sin Precio"));
}

#[test]
fn catalog_without_price_column_is_fatal() {
    let csv = "Nombre,Equipo,Posicion\nIker,Nimi FC,Portero\n";
    match Catalog::from_reader(csv.as_bytes(), b',') {
        Err(CatalogError::MissingColumn { column }) => assert_eq!(column, "ValorActual"),
        other => panic!("expected MissingColumn, got: {other:?}"),
    }
}

#[test]
fn every_catalog_player_round_trips_through_lookup_codec() {
    let catalog = fixture_catalog();
    let codec = LookupCodec::new(&catalog).unwrap();
    for player in catalog.players() {
        let decoded = codec.decode(&codec.encode(player));
        assert_eq!(decoded.name, clean_name(&player.name));
        assert_eq!(decoded.price, player.price, "price of {}", player.name);
    }
}

#[test]
fn every_catalog_player_round_trips_through_inline_codec() {
    let catalog = fixture_catalog();
    for player in catalog.players() {
        let decoded = InlineCodec.decode(&InlineCodec.encode(player));
        assert_eq!(decoded.name, clean_name(&player.name));
        assert_eq!(decoded.price, Price::from_euros(player.price.whole_euros()));
    }
}

#[test]
fn accent_collision_is_reported_not_deduped() {
    let catalog =
        Catalog::load_file(&Path::new(FIXTURES).join("collision.csv"), b',').unwrap();
    match codec::build(CodecKind::Lookup, &catalog) {
        Err(CodecError::AmbiguousName { cleaned, .. }) => assert_eq!(cleaned, "Smith"),
        Err(other) => panic!("expected AmbiguousName, got: {other}"),
        Ok(_) => panic!("expected AmbiguousName, got a codec"),
    }
    assert!(codec::build(CodecKind::Inline, &catalog).is_ok());
}

#[test]
fn label_without_price_marker_costs_nothing() {
    let decoded = InlineCodec.decode("Pablo Sáez, Armando CF.");
    assert_eq!(decoded.name, "Pablo Saez");
    assert_eq!(decoded.price, Price::ZERO);
}

// ===========================================================================
// Full submission flow
// ===========================================================================

#[test]
fn lookup_lineup_is_stored_with_cleaned_names() {
    let catalog = fixture_catalog();
    let codec = LookupCodec::new(&catalog).unwrap();
    let selection = pick(&catalog, &codec, Formation::ThreeTwoOne, &cheap_three_two_one());
    let entry = LineupEntry {
        user: "  ana  ".into(),
        formation: Formation::ThreeTwoOne,
        roster: selection,
        predictions: vec![],
    };
    let ctx = SubmissionContext {
        round_label: "J4",
        catalog: &catalog,
        codec: &codec,
        rules: rules_without_predictions(),
    };

    let store = scratch_csv_store("lineup_it_lookup_flow");
    let record = submission::submit(&store, &entry, &ctx).unwrap();

    let rows = store.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], record.id.to_string());
    assert_eq!(
        rows[0][1..].to_vec(),
        vec![
            "ana",
            "J4",
            "Iker Muniain",
            "Ramon Ortega",
            "Dani Vidal",
            "Sergio Peña",
            "Lucia Prieto",
            "Marta Gil",
            "Hugo Nuñez",
        ]
    );
    let _ = fs::remove_dir_all(store.path().parent().unwrap());
}

#[test]
fn over_budget_lineup_is_not_stored() {
    let catalog = fixture_catalog();
    let codec = LookupCodec::new(&catalog).unwrap();
    let mut names = cheap_three_two_one();
    names[6] = (Position::Forward, "Raúl Iglesias");
    let entry = LineupEntry {
        user: "ana".into(),
        formation: Formation::ThreeTwoOne,
        roster: pick(&catalog, &codec, Formation::ThreeTwoOne, &names),
        predictions: vec![],
    };
    let ctx = SubmissionContext {
        round_label: "J4",
        catalog: &catalog,
        codec: &codec,
        rules: rules_without_predictions(),
    };

    let store = scratch_csv_store("lineup_it_over_budget");
    let err = submission::submit(&store, &entry, &ctx).unwrap_err();
    match err {
        SubmitError::Invalid(ValidationError::BudgetExceeded { total, cap }) => {
            assert_eq!(total, Price::from_cents(71_075));
            assert_eq!(cap, Price::from_euros(700));
        }
        other => panic!("expected BudgetExceeded, got: {other}"),
    }
    assert!(store.rows().unwrap().is_empty());
}

#[test]
fn duplicate_pick_is_rejected_with_zero_appends() {
    let catalog = fixture_catalog();
    let codec = LookupCodec::new(&catalog).unwrap();
    let mut names = cheap_three_two_one();
    names[2] = (Position::Defender, "Ramón Ortega");
    let entry = LineupEntry {
        user: "ana".into(),
        formation: Formation::ThreeTwoOne,
        roster: pick(&catalog, &codec, Formation::ThreeTwoOne, &names),
        predictions: vec![],
    };
    let ctx = SubmissionContext {
        round_label: "J4",
        catalog: &catalog,
        codec: &codec,
        rules: rules_without_predictions(),
    };

    let store = scratch_csv_store("lineup_it_duplicate");
    let err = submission::submit(&store, &entry, &ctx).unwrap_err();
    assert!(matches!(
        err,
        SubmitError::Invalid(ValidationError::DuplicatePlayer { ref name }) if name == "Ramon Ortega"
    ));
    assert!(store.rows().unwrap().is_empty());
}

#[test]
fn budget_boundary_700_passes_701_fails() {
    let player = |name: &str, position, euros| PlayerRecord {
        name: name.into(),
        team: "Equipo".into(),
        position,
        price: Price::from_euros(euros),
    };
    let catalog = Catalog::new(vec![
        player("G", Position::Goalkeeper, 100),
        player("G2", Position::Goalkeeper, 101),
        player("D1", Position::Defender, 100),
        player("D2", Position::Defender, 100),
        player("D3", Position::Defender, 100),
        player("M1", Position::Midfielder, 100),
        player("M2", Position::Midfielder, 100),
        player("F1", Position::Forward, 100),
    ]);
    let label = |name: &str, euros: u64| format!("{name}, Equipo. ({euros}€)");
    let selection = |goalkeeper: &str, euros: u64| RosterSelection {
        goalkeeper: label(goalkeeper, euros),
        defenders: vec![label("D1", 100), label("D2", 100), label("D3", 100)],
        midfielders: vec![label("M1", 100), label("M2", 100)],
        forwards: vec![label("F1", 100)],
    };
    let ctx = SubmissionContext {
        round_label: "J1",
        catalog: &catalog,
        codec: &InlineCodec,
        rules: rules_without_predictions(),
    };
    let entry = |goalkeeper, euros| LineupEntry {
        user: "ana".into(),
        formation: Formation::ThreeTwoOne,
        roster: selection(goalkeeper, euros),
        predictions: vec![],
    };

    let at_cap = submission::prepare(&entry("G", 100), &ctx).unwrap();
    assert_eq!(at_cap.total, Price::from_euros(700));
    assert!(matches!(
        submission::prepare(&entry("G2", 101), &ctx),
        Err(SubmitError::Invalid(ValidationError::BudgetExceeded { .. }))
    ));
}

#[test]
fn partial_three_two_one_validates_over_filled_slots() {
    let catalog = fixture_catalog();
    let codec = LookupCodec::new(&catalog).unwrap();
    let names = [
        (Position::Goalkeeper, "Iker Muniain"),
        (Position::Defender, "Dani Vidal"),
        (Position::Forward, "Pablo Sáez"),
    ];
    let entry = LineupEntry {
        user: "ana".into(),
        formation: Formation::ThreeTwoOne,
        roster: pick(&catalog, &codec, Formation::ThreeTwoOne, &names),
        predictions: vec![],
    };
    let ctx = SubmissionContext {
        round_label: "J4",
        catalog: &catalog,
        codec: &codec,
        rules: rules_without_predictions(),
    };

    let record = submission::prepare(&entry, &ctx).unwrap();
    assert_eq!(
        record.names,
        vec!["Iker Muniain", "Dani Vidal", "", "", "", "", "Pablo Saez"]
    );
}

#[test]
fn empty_user_is_rejected_before_anything_else() {
    let catalog = fixture_catalog();
    let codec = LookupCodec::new(&catalog).unwrap();
    let entry = LineupEntry {
        user: "   ".into(),
        formation: Formation::TwoTwoTwo,
        roster: RosterSelection::default(),
        predictions: vec![],
    };
    let ctx = SubmissionContext {
        round_label: "J4",
        catalog: &catalog,
        codec: &codec,
        rules: rules_without_predictions(),
    };
    let store = scratch_csv_store("lineup_it_empty_user");
    assert!(matches!(
        submission::submit(&store, &entry, &ctx),
        Err(SubmitError::Invalid(ValidationError::IdentityMissing))
    ));
    assert!(store.rows().unwrap().is_empty());
}

fn forged_entry(roster: RosterSelection) -> LineupEntry {
    LineupEntry {
        user: "ana".into(),
        formation: Formation::ThreeTwoOne,
        roster,
        predictions: vec![],
    }
}

#[test]
fn inline_label_with_edited_price_is_not_stored() {
    let catalog = fixture_catalog();
    let mut roster = pick(&catalog, &InlineCodec, Formation::ThreeTwoOne, &cheap_three_two_one());
    roster.forwards[0] = "Pablo Sáez, Armando CF. (1€)".into();
    let ctx = SubmissionContext {
        round_label: "J4",
        catalog: &catalog,
        codec: &InlineCodec,
        rules: rules_without_predictions(),
    };

    let store = scratch_csv_store("lineup_it_edited_price");
    let err = submission::submit(&store, &forged_entry(roster), &ctx).unwrap_err();
    match err {
        SubmitError::Roster(RosterError::NotOffered { slot, label }) => {
            assert_eq!(slot, Slot { position: Position::Forward, index: 0 });
            assert_eq!(label, "Pablo Sáez, Armando CF. (1€)");
        }
        other => panic!("expected NotOffered, got: {other}"),
    }
    assert!(store.rows().unwrap().is_empty());
}

#[test]
fn lookup_label_for_unknown_player_is_not_stored() {
    let catalog = fixture_catalog();
    let codec = LookupCodec::new(&catalog).unwrap();
    let mut roster = pick(&catalog, &codec, Formation::ThreeTwoOne, &cheap_three_two_one());
    roster.midfielders[1] = "Lionel Messi, PSG. (0,00€)".into();
    let ctx = SubmissionContext {
        round_label: "J4",
        catalog: &catalog,
        codec: &codec,
        rules: rules_without_predictions(),
    };

    let store = scratch_csv_store("lineup_it_unknown_player");
    let err = submission::submit(&store, &forged_entry(roster), &ctx).unwrap_err();
    assert!(matches!(
        err,
        SubmitError::Roster(RosterError::NotOffered { ref label, .. }) if label.starts_with("Lionel Messi")
    ));
    assert!(store.rows().unwrap().is_empty());
}

#[test]
fn label_in_the_wrong_position_is_not_stored() {
    let catalog = fixture_catalog();
    let codec = LookupCodec::new(&catalog).unwrap();
    let mut roster = pick(&catalog, &codec, Formation::ThreeTwoOne, &cheap_three_two_one());
    let defender = roster.defenders[0].clone();
    roster.goalkeeper = defender.clone();
    roster.defenders[0] = String::new();
    let ctx = SubmissionContext {
        round_label: "J4",
        catalog: &catalog,
        codec: &codec,
        rules: rules_without_predictions(),
    };

    let store = scratch_csv_store("lineup_it_wrong_position");
    let err = submission::submit(&store, &forged_entry(roster), &ctx).unwrap_err();
    match err {
        SubmitError::Roster(e) => assert_eq!(
            e,
            RosterError::NotOffered {
                slot: Slot { position: Position::Goalkeeper, index: 0 },
                label: defender,
            }
        ),
        other => panic!("expected NotOffered, got: {other}"),
    }
    assert!(store.rows().unwrap().is_empty());
}

// ===========================================================================
// Predictions with the shipped config
// ===========================================================================

fn default_predictions(nimi_winner: &str) -> Vec<PredictionEntry> {
    vec![
        PredictionEntry {
            winner: nimi_winner.into(),
            home_goals: GoalCount::Zero,
            away_goals: GoalCount::SixOrMore,
        },
        PredictionEntry {
            winner: "Empate".into(),
            home_goals: GoalCount::Two,
            away_goals: GoalCount::Two,
        },
    ]
}

#[test]
fn prediction_winner_matches_resolved_rival_name_not_config_key() {
    let config = default_config("lineup_it_predictions_regression");
    let set = config.predictions.as_ref().expect("defaults enable predictions");
    let catalog = fixture_catalog();
    let ctx = SubmissionContext {
        round_label: &config.league.round,
        catalog: &catalog,
        codec: &InlineCodec,
        rules: Rules {
            budget_cap: config.league.budget_cap_price(),
            predictions: Some(set),
        },
    };
    let entry = |winner: &str| LineupEntry {
        user: "ana".into(),
        formation: Formation::ThreeTwoOne,
        roster: RosterSelection::default(),
        predictions: default_predictions(winner),
    };

    let record = submission::prepare(&entry("Nimi FC"), &ctx).unwrap();
    assert_eq!(
        record.predictions,
        vec![
            ("Nimi FC".to_string(), "0-+".to_string()),
            ("Empate".to_string(), "2-2".to_string()),
        ]
    );

    assert!(matches!(
        submission::prepare(&entry("Nimi_rival"), &ctx),
        Err(SubmitError::Invalid(ValidationError::PredictionMismatch { .. }))
    ));
}

// ===========================================================================
// Store backends
// ===========================================================================

fn two_submissions(store: &dyn SubmissionStore, scratch: &str) {
    let config = default_config(scratch);
    let set = config.predictions.as_ref().unwrap();
    let catalog = fixture_catalog();
    let ctx = SubmissionContext {
        round_label: "J9",
        catalog: &catalog,
        codec: &InlineCodec,
        rules: Rules {
            budget_cap: config.league.budget_cap_price(),
            predictions: Some(set),
        },
    };
    for user in ["ana", "luis"] {
        let entry = LineupEntry {
            user: user.into(),
            formation: Formation::TwoThreeOne,
            roster: RosterSelection {
                goalkeeper: "Iker Muniain, Nimi FC. (95€)".into(),
                ..Default::default()
            },
            predictions: default_predictions("Nimi FC"),
        };
        submission::submit(store, &entry, &ctx).unwrap();
    }
}

#[test]
fn csv_store_keeps_fixed_column_layout() {
    let store = scratch_csv_store("lineup_it_csv_layout");
    two_submissions(&store, "lineup_it_csv_layout_config");

    let rows = store.rows().unwrap();
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.len(), 3 + 7 + 4);
        assert_eq!(row[3], "Iker Muniain");
        assert_eq!(row[10], "Nimi FC");
    }
    assert_eq!(rows[1][1], "luis");
    assert_ne!(rows[0][0], rows[1][0]);
    let _ = fs::remove_dir_all(store.path().parent().unwrap());
}

#[test]
fn sqlite_store_via_config_keeps_rows_in_order() {
    let dir = std::env::temp_dir().join("lineup_it_sqlite");
    let _ = fs::remove_dir_all(&dir);
    let store = store::open(&StoreConfig {
        kind: StoreKind::Sqlite,
        path: dir.join("entradas.db"),
    })
    .unwrap();
    two_submissions(store.as_ref(), "lineup_it_sqlite_config");

    let rows = store.rows().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][1], "ana");
    assert_eq!(rows[1][1], "luis");
    assert_eq!(rows[0][9], "");
    assert_eq!(rows[0][11], "0-+");

    drop(store);
    let reopened = SqliteStore::open(&dir.join("entradas.db")).unwrap();
    assert_eq!(reopened.rows().unwrap().len(), 2);
    let _ = fs::remove_dir_all(&dir);
}
