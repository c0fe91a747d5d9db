use std::path::PathBuf;

use ip_tam_dashboard::dashboard::{compare, recompute, DashboardParams};
use ip_tam_dashboard::domain::{Field, Region, Seniority, Tier};
use ip_tam_dashboard::export::to_csv_bytes;
use ip_tam_dashboard::pipeline::processing::filter::{Facet, FilterSet};
use ip_tam_dashboard::pipeline::{prepare_base_table, prepare_base_table_from_bytes, BaseTable};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resources/sample_profiles.csv")
}

fn base() -> BaseTable {
    prepare_base_table(&fixture_path()).expect("fixture should load")
}

fn params(filters: FilterSet) -> DashboardParams {
    DashboardParams {
        filters,
        ..Default::default()
    }
}

#[test]
fn test_fixture_normalizes() {
    let base = base();
    let table = &base.table;

    assert_eq!(table.len(), 50);
    assert!(table.has_field(Field::PatentsRecent));
    assert!(table.has_field(Field::JobTitleNormalized));
    assert!(table.has_field(Field::Country));
    assert!(table
        .rows
        .iter()
        .all(|r| Region::ALL.contains(&r.region)));

    let quanta: Vec<_> = table
        .rows
        .iter()
        .filter(|r| r.company.as_deref() == Some("Quanta Labs"))
        .collect();
    assert!(quanta.iter().all(|r| r.region == Region::NorthAmerica));
    assert_eq!(quanta[0].seniority, Some(Seniority::Senior));
    assert_eq!(quanta[1].seniority, None);
    assert_eq!(quanta[0].job_title, None);
    assert_eq!(quanta[1].job_title_normalized.as_deref(), Some("Licensing Manager"));
    assert_eq!(quanta[2].job_title_normalized.as_deref(), Some("Legal Operations Lead"));
    assert_eq!(quanta[0].country.as_deref(), Some("United States"));

    assert_eq!(base.report.unparseable_cells.get(&Field::PatentsTotal), Some(&3));
    assert_eq!(base.report.unparseable_cells.get(&Field::Seniority), Some(&1));
}

#[test]
fn test_end_to_end_tiering_and_tier_filter() {
    let base = base();

    let view = recompute(&base.table, &DashboardParams::default());
    let tiers: Vec<(&str, usize, Option<Tier>)> = view
        .snapshot
        .companies
        .iter()
        .map(|c| (c.name(), c.profile_count, c.tier))
        .collect();
    assert_eq!(
        tiers,
        vec![
            ("Orion Pharma", 35, Some(Tier::T1)),
            ("Helix Devices", 12, Some(Tier::T2)),
            ("Quanta Labs", 3, Some(Tier::T3)),
        ]
    );

    let t1_only = recompute(&base.table, &params(FilterSet::default().include(Facet::Tier, "T1")));
    assert_eq!(t1_only.snapshot.companies.len(), 1);
    assert_eq!(t1_only.snapshot.companies[0].name(), "Orion Pharma");
}

#[test]
fn test_profile_counts_match_filtered_rows() {
    let base = base();
    let filter_sets = vec![
        FilterSet::default(),
        FilterSet::default().include(Facet::Region, "NA"),
        FilterSet::default().exclude(Facet::Seniority, "Senior"),
        FilterSet::default()
            .include(Facet::Persona, "Portfolio")
            .include(Facet::Persona, "Litigation")
            .exclude(Facet::Industry, "Diagnostics"),
        FilterSet::default().include(Facet::CompanySize, "Enterprise"),
    ];

    for filters in filter_sets {
        let view = recompute(&base.table, &params(filters));
        let total: usize = view.snapshot.companies.iter().map(|c| c.profile_count).sum();
        assert_eq!(total, view.filtered.len());
        for company in &view.snapshot.companies {
            let rows = view
                .filtered
                .rows
                .iter()
                .filter(|r| r.company == company.company)
                .count();
            assert_eq!(company.profile_count, rows);
        }
    }
}

#[test]
fn test_exclude_absorbs_include() {
    let base = base();
    let filters = FilterSet::default()
        .include(Facet::Region, "EU")
        .include(Facet::Region, "NA")
        .exclude(Facet::Region, "EU");
    let view = recompute(&base.table, &params(filters));
    assert!(view.filtered.rows.iter().all(|r| r.region == Region::NorthAmerica));
    assert_eq!(view.filtered.len(), 15);
}

#[test]
fn test_mode_tie_keeps_first_value() {
    let base = base();
    let view = recompute(&base.table, &DashboardParams::default());
    let helix = &view.snapshot.companies[1];
    // six "Medical Devices" rows precede six "Diagnostics" rows
    assert_eq!(helix.industry.as_deref(), Some("Medical Devices"));
    assert_eq!(helix.workflow.as_deref(), Some("Licensing"));
}

#[test]
fn test_density_excludes_zero_headcount_and_trims_display() {
    let base = base();
    let view = recompute(&base.table, &DashboardParams::default());
    let density = &view.snapshot.density;

    let companies: Vec<&str> = density.points.iter().map(|p| p.company.as_str()).collect();
    assert_eq!(companies, vec!["Orion Pharma", "Helix Devices"]);
    assert!((density.points[1].density - 6.0).abs() < 1e-9);
    assert_eq!(density.outliers, 1);
    assert_eq!(density.by_tier.len(), 1);
    assert_eq!(density.by_tier[0].tier, Tier::T1);
}

#[test]
fn test_patent_totals_count_each_company_once() {
    let base = base();
    let summary = recompute(&base.table, &DashboardParams::default()).snapshot.summary;
    assert_eq!(summary.total_patents, Some(980.0));
    assert_eq!(summary.total_patents_recent, Some(135.0));
    assert_eq!(summary.accounts_with_patent_data, Some(2));
    let patents = summary.patents.expect("patent stats");
    assert_eq!(patents.accounts, 2);
    assert_eq!(patents.median_total, 490.0);
}

#[test]
fn test_export_round_trip() {
    let base = base();
    let view = recompute(
        &base.table,
        &params(FilterSet::default().exclude(Facet::Tier, "T2")),
    );

    let bytes = to_csv_bytes(&view.filtered).unwrap();
    let reloaded = prepare_base_table_from_bytes(&bytes).unwrap();

    assert_eq!(reloaded.table.len(), view.filtered.len());
    assert_eq!(reloaded.table.headers(), view.filtered.headers());
    assert_eq!(reloaded.table, view.filtered);
}

#[test]
fn test_comparison_deltas() {
    let base = base();
    let left = DashboardParams::default();
    let right = params(FilterSet::default().include(Facet::Region, "EU"));
    let comparison = compare(&base.table, &left, &right);

    assert_eq!(comparison.left.summary.accounts, 3);
    assert_eq!(comparison.right.summary.accounts, 1);
    assert_eq!(comparison.delta.accounts, -2);
    assert_eq!(comparison.delta.profiles, -15);
    assert_eq!(comparison.delta.total_patents, Some(-80.0));
}
