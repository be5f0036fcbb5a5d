//! End-to-end rebuild tests against an in-memory database

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tempfile::TempDir;
use tiresearch_common::catalog::Catalog;
use tiresearch_common::db::{create_schema, fetch_all_tires, TireSize};
use tiresearch_loader::rebuild_catalog;

async fn setup_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    create_schema(&pool).await.unwrap();
    pool
}

/// Write the catalog and any size files into a temp dir and parse it
fn write_catalog(catalog: &str, size_files: &[(&str, &str)]) -> (TempDir, Catalog) {
    let dir = TempDir::new().unwrap();
    for (name, content) in size_files {
        let path = dir.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
    let catalog_path = dir.path().join("catalog.toml");
    std::fs::write(&catalog_path, catalog).unwrap();
    let catalog = Catalog::from_file(&catalog_path).unwrap();
    (dir, catalog)
}

async fn all_tires(pool: &SqlitePool) -> Vec<TireSize> {
    let mut conn = pool.acquire().await.unwrap();
    fetch_all_tires(&mut conn).await.unwrap()
}

fn find<'a>(tires: &'a [TireSize], model: &str) -> &'a TireSize {
    tires.iter().find(|t| t.model == model).unwrap()
}

const ACME: &str = r#"
    [manufacturers.Acme.Racer]
    asymmetrical = false
    directional = true
    treadwear = 200
    tire_type = "2s"
    [manufacturers.Acme.Racer.sizes]
    "17" = [
      { sku = "A1", width = 225, aspect_ratio = 45, weight = 20.0, tire_diameter = 25.0, min_wheel_width = 7.5, max_wheel_width = 8.5 },
      { sku = "A2", width = 225, aspect_ratio = 45, weight = 22.0, tire_diameter = 25.0, min_wheel_width = 7.5, max_wheel_width = 8.5 },
    ]
"#;

#[tokio::test]
async fn test_duplicate_sizes_collapse_to_mean_weight() {
    let pool = setup_pool().await;
    let (_dir, catalog) = write_catalog(ACME, &[]);

    let report = rebuild_catalog(&pool, &catalog, None).await.unwrap();
    assert_eq!(report.load.inserted, 2);
    assert_eq!(report.dedup.rows_before, 2);
    assert_eq!(report.dedup.rows_after, 1);

    let tires = all_tires(&pool).await;
    assert_eq!(tires.len(), 1);
    assert_eq!(tires[0].weight, Some(21.0));
    assert_eq!(tires[0].sku, None);
    assert_eq!(tires[0].treadwear, Some(200));
}

#[tokio::test]
async fn test_tire_diameter_imputed_from_size_peers() {
    let pool = setup_pool().await;
    let (_dir, catalog) = write_catalog(
        r#"
        [manufacturers.Acme.A]
        asymmetrical = false
        directional = false
        tire_type = "2s"
        sizes = "a.csv"

        [manufacturers.Acme.B]
        asymmetrical = false
        directional = false
        tire_type = "2s"
        sizes = "b.csv"

        [manufacturers.Acme.C]
        asymmetrical = false
        directional = false
        tire_type = "2s"
        sizes = "c.csv"

        [manufacturers.Acme.D]
        asymmetrical = false
        directional = false
        tire_type = "2s"
        sizes = "d.csv"
        "#,
        &[
            ("a.csv", "225,45,17,,,,,20,7.5,8.5,,,,24.0\n"),
            ("b.csv", "225,45,17,,,,,20,7.5,8.5,,,,25.0\n"),
            ("c.csv", "225,45,17,,,,,20,7.5,8.5,,,,26.0\n"),
            ("d.csv", "225,45,17,,,,,20,7.5,8.5\n"),
        ],
    );

    rebuild_catalog(&pool, &catalog, None).await.unwrap();

    let tires = all_tires(&pool).await;
    assert_eq!(tires.len(), 4);
    assert_eq!(find(&tires, "D").tire_diameter, Some(25.0));
    assert_eq!(find(&tires, "A").tire_diameter, Some(24.0));
}

#[tokio::test]
async fn test_unresolvable_gaps_use_fallbacks() {
    let pool = setup_pool().await;
    let (_dir, catalog) = write_catalog(
        r#"
        [manufacturers.Acme.Lonely]
        asymmetrical = false
        directional = false
        tire_type = "4a"
        sizes = "lonely.csv"
        "#,
        &[("lonely.csv", "195,65,15,,,,,,0,0\n")],
    );

    rebuild_catalog(&pool, &catalog, None).await.unwrap();

    let tire = &all_tires(&pool).await[0];
    assert_eq!(tire.weight, Some(25.0));
    assert_eq!(tire.tire_diameter, Some(25.0));
    assert_eq!(tire.min_wheel_width, 6.0);
    assert_eq!(tire.max_wheel_width, 6.0);
}

#[tokio::test]
async fn test_wheel_width_falls_back_to_width_peers() {
    let pool = setup_pool().await;
    let (_dir, catalog) = write_catalog(
        r#"
        [manufacturers.Acme.Zero]
        asymmetrical = false
        directional = false
        tire_type = "2s"
        sizes = "zero.csv"

        [manufacturers.Acme.Peer]
        asymmetrical = false
        directional = false
        tire_type = "2s"
        sizes = "peer.csv"
        "#,
        &[
            // same size bucket only has zeros; width 225 elsewhere has 7.0 / 8.0
            ("zero.csv", "225,45,17,,,,,,0,0\n"),
            (
                "peer.csv",
                "225,45,17,,,,,,0,0\n225,50,16,,,,,,7.0,8.0\n225,55,16,,,,,,7.0,8.0\n225,40,18,,,,,,7.5,9.0\n",
            ),
        ],
    );

    let report = rebuild_catalog(&pool, &catalog, None).await.unwrap();
    assert_eq!(report.load.inserted, 5);

    let tires = all_tires(&pool).await;
    let zero = find(&tires, "Zero");
    assert_eq!(zero.min_wheel_width, 7.0);
    assert_eq!(zero.max_wheel_width, 8.0);
    for tire in &tires {
        assert!(tire.min_wheel_width > 0.0);
        assert!(tire.max_wheel_width > 0.0);
    }
}

#[tokio::test]
async fn test_wheel_width_mode_ties_take_lowest_and_skip_zeros() {
    let pool = setup_pool().await;
    let (_dir, catalog) = write_catalog(
        r#"
        [manufacturers.Acme.Seven]
        asymmetrical = false
        directional = false
        tire_type = "2s"
        sizes = "seven.csv"

        [manufacturers.Acme.Eight]
        asymmetrical = false
        directional = false
        tire_type = "2s"
        sizes = "eight.csv"

        [manufacturers.Acme.Gap]
        asymmetrical = false
        directional = false
        tire_type = "2s"
        sizes = "gap.csv"
        "#,
        &[
            // 225/45R17: one 8.0, one 7.0, one zero
            // 255/35R18: only a zero in the bucket; width 255 elsewhere ties 7.5 / 6.5
            ("seven.csv", "225,45,17,,,,,,7.0,9.0\n255,40,17,,,,,,7.5,9.5\n"),
            ("eight.csv", "225,45,17,,,,,,8.0,9.0\n255,45,16,,,,,,6.5,9.5\n"),
            ("gap.csv", "225,45,17,,,,,,0,9.0\n255,35,18,,,,,,0,9.5\n"),
        ],
    );

    rebuild_catalog(&pool, &catalog, None).await.unwrap();

    let tires = all_tires(&pool).await;
    let gap = |code: &str| {
        tires
            .iter()
            .find(|t| t.model == "Gap" && t.tire_code() == code)
            .unwrap()
    };
    assert_eq!(gap("225/45R17").min_wheel_width, 7.0);
    assert_eq!(gap("255/35R18").min_wheel_width, 6.5);
    assert_eq!(find(&tires, "Eight").min_wheel_width, 8.0);
}

#[tokio::test]
async fn test_non_finite_values_reject_the_row_not_the_rebuild() {
    let pool = setup_pool().await;
    let (_dir, catalog) = write_catalog(
        r#"
        [manufacturers.Acme.Racer]
        asymmetrical = false
        directional = true
        tire_type = "2s"
        sizes = "racer.csv"

        [manufacturers.Acme.Inline]
        asymmetrical = false
        directional = true
        tire_type = "2s"
        [manufacturers.Acme.Inline.sizes]
        "17" = [ { width = 225, aspect_ratio = 45, min_wheel_width = nan, max_wheel_width = 8.5 } ]
        "#,
        &[(
            "racer.csv",
            "225,45,17,,,,,20,7.5,8.5,,,,25.0\n245,40,NaN,,,,,20,7.5,8.5\n",
        )],
    );

    let report = rebuild_catalog(&pool, &catalog, None).await.unwrap();
    assert_eq!(report.load.inserted, 1);
    assert_eq!(report.load.rejected.len(), 2);
    assert_eq!(all_tires(&pool).await.len(), 1);
}

#[tokio::test]
async fn test_invalid_csv_rows_are_excluded() {
    let pool = setup_pool().await;
    let (_dir, catalog) = write_catalog(
        r#"
        [manufacturers.Toyo."Proxes RA1"]
        asymmetrical = false
        directional = true
        tire_type = "0dotr"
        sizes = "toyo/proxes_ra_1.csv"
        "#,
        &[(
            "toyo/proxes_ra_1.csv",
            "225,45,17,,,,,24,7.5,8.5,,,,25\n,45,17,,,,,24,7.5,8.5\n245,40,,,,,,24,8.0,9.5\n",
        )],
    );

    let report = rebuild_catalog(&pool, &catalog, None).await.unwrap();
    assert_eq!(report.load.inserted, 1);
    assert_eq!(report.load.rejected.len(), 2);
    assert_eq!(report.load.rejected[1].size_code, "245/40R?");

    let tires = all_tires(&pool).await;
    assert_eq!(tires.len(), 1);
    assert_eq!(tires[0].tire_code(), "225/45R17");
}

#[tokio::test]
async fn test_rebuild_is_idempotent() {
    let pool = setup_pool().await;
    let (_dir, catalog) = write_catalog(
        &format!(
            "{}\n{}",
            ACME,
            r#"
            [manufacturers.Dunlop."Direzza DZ101"]
            asymmetrical = false
            directional = false
            tire_type = "1hps"
            sizes = "dz101.csv"
            "#
        ),
        &[(
            "dz101.csv",
            "205,50,15,,,,,19,6.0,7.5\n205,50,15,,,,,21,0,7.5\n225,45,17,,,,,,7.5,8.5,,,,24.9\n",
        )],
    );

    rebuild_catalog(&pool, &catalog, None).await.unwrap();
    let first = all_tires(&pool).await;

    let report = rebuild_catalog(&pool, &catalog, Some(Path::new("catalog.toml")))
        .await
        .unwrap();
    let second = all_tires(&pool).await;

    assert_eq!(report.cleared, first.len() as u64);
    assert_eq!(first, second);

    let runs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM load_runs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(runs, 2);
}

#[tokio::test]
async fn test_keys_unique_and_required_fields_present() {
    let pool = setup_pool().await;
    let (_dir, catalog) = write_catalog(
        r#"
        [manufacturers.Acme.Racer]
        asymmetrical = false
        directional = true
        tire_type = "2s"
        sizes = "racer.csv"
        "#,
        &[(
            "racer.csv",
            "225,45,17,,,,,20,7.5,8.5\n225,45,17,,,,,22,7.5,8.5\n225,45,17,,,,,,8.0,9.0\n245,40,18,,,,,,8.5,9.5\n",
        )],
    );

    rebuild_catalog(&pool, &catalog, None).await.unwrap();

    let duplicates: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM (SELECT 1 FROM tires \
         GROUP BY manufacturer, model, width, aspect_ratio, wheel_diameter HAVING COUNT(*) > 1)",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(duplicates, 0);

    let gaps: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM tires WHERE weight IS NULL OR tire_diameter IS NULL \
         OR min_wheel_width IS NULL OR min_wheel_width = 0 \
         OR max_wheel_width IS NULL OR max_wheel_width = 0",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(gaps, 0);

    let tires = all_tires(&pool).await;
    assert_eq!(tires.len(), 2);
    // third row imputed the 21.0 mean before the three merged
    assert_eq!(tires[0].weight, Some(21.0));
}

#[tokio::test]
async fn test_failed_rebuild_keeps_previous_rows() {
    let pool = setup_pool().await;
    let (_dir, catalog) = write_catalog(ACME, &[]);
    rebuild_catalog(&pool, &catalog, None).await.unwrap();
    let before = all_tires(&pool).await;

    // run history write fails at the very end of the transaction
    sqlx::query("DROP TABLE load_runs")
        .execute(&pool)
        .await
        .unwrap();

    let (_dir2, other) = write_catalog(
        r#"
        [manufacturers.Other.Model]
        asymmetrical = true
        directional = false
        tire_type = "6w"
        [manufacturers.Other.Model.sizes]
        "16" = [ { width = 205, aspect_ratio = 55, min_wheel_width = 6.0, max_wheel_width = 7.0 } ]
        "#,
        &[],
    );
    assert!(rebuild_catalog(&pool, &other, None).await.is_err());

    assert_eq!(all_tires(&pool).await, before);
}
