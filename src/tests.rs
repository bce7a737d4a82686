use std::fs;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use rusqlite::Connection;
use tempfile::tempdir;

use crate::domain::entities::cell::{Cell, CellNote, Role, SheetGrid};
use crate::extract::extract_dataset;
use crate::infra::import::marking::Marking;
use crate::infra::sqlite::repo::SqliteRepo;
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::repo::ExtractRepository;
use crate::usecase::services::import_service::ImportService;
use crate::usecase::services::query_service::QueryService;

fn census_grid() -> SheetGrid {
    let mut grid = SheetGrid::new("population", 3, 2);
    grid.insert(Cell::new(0, 0, Role::RowProperty, "City"));
    grid.insert(Cell::new(0, 1, Role::ColumnHeader, "Population"));
    grid.insert(Cell::new(1, 0, Role::RowHeader, "Amsterdam"));
    grid.insert(Cell::new(1, 1, Role::Data, "10"));
    grid.insert(Cell::new(2, 0, Role::HierarchicalRowHeader, "id."));
    grid.insert(Cell::new(2, 1, Role::Data, "5"));
    grid
}

#[test]
fn init_db_creates_required_tables() {
    let temp_dir = tempdir().expect("should create temp dir");
    let db_path = temp_dir.path().join("extract.sqlite");

    init_db(&db_path).expect("init_db should succeed");

    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
             ('dataset','sheet','sheet_title','header_node','observation',\
              'observation_dimension','annotation')",
            [],
            |row| row.get(0),
        )
        .expect("table count query should succeed");

    assert_eq!(table_count, 7, "required tables should exist");
}

#[test]
fn extracted_dataset_round_trips_through_sqlite() {
    let temp_dir = tempdir().expect("should create temp dir");
    let db_path = temp_dir.path().join("extract.sqlite");

    let extract = extract_dataset("vt1899", "vt1899.xlsx", &[census_grid()]);

    let repo = Arc::new(SqliteRepo::new(db_path));
    repo.init().expect("store should initialize");
    let dataset_id = repo.save_dataset(&extract).expect("extract should persist");

    let queries = QueryService::new(repo);

    let datasets = queries.list_datasets().expect("should list datasets");
    assert_eq!(datasets.len(), 1);
    assert_eq!(datasets[0].name, "vt1899");
    assert_eq!(datasets[0].source_path, "vt1899.xlsx");
    assert_eq!(datasets[0].sheet_count, 1);

    let sheets = queries.list_sheets(dataset_id).expect("should list sheets");
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].name, "population");
    assert_eq!(sheets[0].row_count, 3);
    assert_eq!(sheets[0].col_count, 2);
    assert_eq!(sheets[0].marked_cells, 6);

    let nodes = queries.list_nodes(sheets[0].id).expect("should list nodes");
    assert_eq!(nodes.len(), 3);
    let city = nodes.iter().find(|n| n.label == "City").unwrap();
    assert_eq!(city.kind, "row_property");
    let amsterdam = nodes.iter().find(|n| n.label == "Amsterdam").unwrap();
    assert_eq!(amsterdam.kind, "row_header");
    assert_eq!(amsterdam.bound_property_id, Some(city.id));

    let observations = queries
        .observations(sheets[0].id)
        .expect("should load observations");
    assert_eq!(observations.len(), 2);
    // The "id." row inherits the Amsterdam node; no second node is minted.
    for observation in &observations {
        assert_eq!(observation.dimensions, vec!["Population", "Amsterdam"]);
    }
    assert_eq!(observations[0].value, "10");
    assert_eq!(observations[1].value, "5");

    let count = queries
        .observation_count(dataset_id)
        .expect("should count observations");
    assert_eq!(count, 2);
}

#[test]
fn annotations_persist_with_author_and_date() {
    let temp_dir = tempdir().expect("should create temp dir");
    let db_path = temp_dir.path().join("extract.sqlite");

    let mut grid = census_grid();
    grid.insert(
        Cell::new(1, 1, Role::Data, "10").with_note(CellNote {
            text: "value partly\nillegible".to_string(),
            author: Some("curator".to_string()),
            date: Some("2010-05-01".to_string()),
        }),
    );

    let extract = extract_dataset("vt1899", "vt1899.xlsx", &[grid]);
    let repo = Arc::new(SqliteRepo::new(db_path));
    repo.init().expect("store should initialize");
    let dataset_id = repo.save_dataset(&extract).expect("extract should persist");

    let sheets = repo.list_sheets(dataset_id).expect("should list sheets");
    let annotations = repo
        .load_annotations(sheets[0].id)
        .expect("should load annotations");
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].row, 1);
    assert_eq!(annotations[0].col, 1);
    assert_eq!(annotations[0].text, "value partly illegible");
    assert_eq!(annotations[0].author.as_deref(), Some("curator"));
    assert_eq!(annotations[0].noted_on.as_deref(), Some("2010-05-01"));
}

#[test]
fn unmarked_sheets_are_not_persisted() {
    let temp_dir = tempdir().expect("should create temp dir");
    let db_path = temp_dir.path().join("extract.sqlite");

    let mut notes_only = SheetGrid::new("front matter", 1, 1);
    notes_only.insert(Cell::new(0, 0, Role::Title, "Volkstelling 1899"));

    let extract = extract_dataset("vt1899", "vt1899.xlsx", &[census_grid(), notes_only]);
    let repo = SqliteRepo::new(db_path);
    repo.init().expect("store should initialize");
    let dataset_id = repo.save_dataset(&extract).expect("extract should persist");

    let datasets = repo.list_datasets().expect("should list datasets");
    // The workbook total still counts the dropped sheet.
    assert_eq!(datasets[0].sheet_count, 2);

    let sheets = repo.list_sheets(dataset_id).expect("should list sheets");
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].name, "population");
}

#[test]
fn marking_file_assigns_roles_per_sheet_and_cell() {
    let temp_dir = tempdir().expect("should create temp dir");
    let marking_path = temp_dir.path().join("marking.txt");
    fs::write(
        &marking_path,
        "0;A1;TL RowProperty\n0;B1;TL ColHeader\n0;A2;TL RowHeader\n0;B2;TL Data\n1;A1;TL Title\n",
    )
    .expect("should write marking file");

    let marking = Marking::from_file(&marking_path).expect("marking should parse");

    assert_eq!(marking.role_at(0, 0, 0), Role::RowProperty);
    assert_eq!(marking.role_at(0, 0, 1), Role::ColumnHeader);
    assert_eq!(marking.role_at(0, 1, 0), Role::RowHeader);
    assert_eq!(marking.role_at(0, 1, 1), Role::Data);
    assert_eq!(marking.role_at(1, 0, 0), Role::Title);
    assert_eq!(marking.role_at(0, 2, 2), Role::Unmarked);
}

#[test]
fn import_service_runs_end_to_end_over_a_real_workbook() {
    use rust_xlsxwriter::{Format, Workbook};

    let temp_dir = tempdir().expect("should create temp dir");
    let xlsx_path = temp_dir.path().join("vt1899.xlsx");
    let marking_path = temp_dir.path().join("vt1899-marking.txt");
    let db_path = temp_dir.path().join("extract.sqlite");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "City").expect("write A1");
    worksheet
        .merge_range(0, 1, 0, 2, "Population", &Format::new())
        .expect("merge B1:C1");
    worksheet.write_string(1, 0, "Amsterdam").expect("write A2");
    worksheet.write_number(1, 1, 10.0).expect("write B2");
    worksheet.write_number(1, 2, 7.0).expect("write C2");
    worksheet.write_string(2, 0, "id.").expect("write A3");
    worksheet.write_number(2, 1, 5.0).expect("write B3");
    workbook.save(&xlsx_path).expect("save workbook");

    fs::write(
        &marking_path,
        "0;A1;TL RowProperty\n0;B1;TL ColHeader\n0;C1;TL ColHeader\n\
         0;A2;TL RowHeader\n0;B2;TL Data\n0;C2;TL Data\n\
         0;A3;TL HRowHeader\n0;B3;TL Data\n",
    )
    .expect("write marking file");

    let repo = Arc::new(SqliteRepo::new(db_path));
    let importer = ImportService::new(repo.clone());
    let result = importer
        .import_workbook(&xlsx_path, &marking_path)
        .expect("import should succeed");
    assert_eq!(result.sheet_count, 1);
    assert_eq!(result.observation_count, 3);

    let sheets = repo.list_sheets(result.dataset_id).expect("sheets");
    let observations = repo
        .load_observations(sheets[0].id)
        .expect("observations");
    assert_eq!(observations.len(), 3);
    // B2: merged "Population" header plus the Amsterdam row binding.
    assert_eq!(observations[0].value, "10");
    assert_eq!(observations[0].dimensions, vec!["Population", "Amsterdam"]);
    // C2 sits under the covered half of the merge; same header node applies.
    assert_eq!(observations[1].value, "7");
    assert_eq!(observations[1].dimensions, vec!["Population", "Amsterdam"]);
    // B3's "id." row header copies down to the node minted at A2.
    assert_eq!(observations[2].value, "5");
    assert_eq!(observations[2].dimensions, vec!["Population", "Amsterdam"]);
}

#[test]
fn repeated_extraction_persists_identical_record_sets() {
    let temp_dir = tempdir().expect("should create temp dir");
    let db_path = temp_dir.path().join("extract.sqlite");

    let grid = census_grid();
    let repo = SqliteRepo::new(db_path);
    repo.init().expect("store should initialize");

    let first = extract_dataset("vt1899", "vt1899.xlsx", std::slice::from_ref(&grid));
    let second = extract_dataset("vt1899", "vt1899.xlsx", std::slice::from_ref(&grid));
    let first_id = repo.save_dataset(&first).expect("first save");
    let second_id = repo.save_dataset(&second).expect("second save");

    let first_sheet = repo.list_sheets(first_id).expect("sheets")[0].id;
    let second_sheet = repo.list_sheets(second_id).expect("sheets")[0].id;
    assert_eq!(
        repo.load_observations(first_sheet).expect("observations"),
        repo.load_observations(second_sheet).expect("observations"),
    );
}
