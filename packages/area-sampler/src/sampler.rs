//! Adaptive recursive sampler.
//!
//! Each region goes through the same cycle:
//!
//! ```text
//! query -> filter against registry -> persist -> saturated?
//!                                                 |- no  -> terminal
//!                                                 `- yes -> 4 children (N, S, E, W)
//! ```
//!
//! A region whose query produced at least `saturation_threshold` new entities
//! probably hit the source's result cap, so it is covered again by four
//! smaller regions. Children are visited depth-first in N, S, E, W order, one
//! query at a time. Refinement stops at `max_depth` or when the refined radius
//! drops below `min_radius_m`, whatever the saturation count says.
//!
//! A data source failure only ends its own branch. A store write failure ends
//! the whole run.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::geo::{child_regions, Direction};
use crate::query::query_for_region;
use crate::registry::DedupRegistry;
use crate::stores::JsonFileStore;
use crate::traits::{source::DataSource, store::EntityStore};
use crate::types::{
    config::{SamplerConfig, SearchRequest},
    region::{Distance, Region},
};

/// How a region's branch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionOutcome {
    /// Fewer new entities than the threshold
    Terminal,
    /// Saturated and split into four children
    Subdivided,
    /// Saturated, but already at the maximum depth
    DepthLimited,
    /// Saturated, but children would fall below the minimum radius
    RadiusFloor,
    /// The data source failed; treated as zero results
    Failed,
}

/// One queried region.
#[derive(Debug, Clone, Serialize)]
pub struct RegionVisit {
    pub depth: u32,
    /// Position relative to the parent (`None` for the root)
    pub direction: Option<Direction>,
    pub region: Region,
    /// Records returned by the source
    pub fetched: usize,
    /// Records not seen earlier in this run
    pub new_records: usize,
    /// Records actually added to the store
    pub written: usize,
    pub outcome: RegionOutcome,
}

/// Result of a search run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchReport {
    /// Regions queried, in visit order
    pub visits: Vec<RegionVisit>,
}

impl SearchReport {
    pub fn regions_queried(&self) -> usize {
        self.visits.len()
    }

    pub fn regions_failed(&self) -> usize {
        self.count_outcome(RegionOutcome::Failed)
    }

    pub fn regions_subdivided(&self) -> usize {
        self.count_outcome(RegionOutcome::Subdivided)
    }

    /// Saturated regions that were not refined because of a depth or radius limit.
    pub fn regions_cut_short(&self) -> usize {
        self.count_outcome(RegionOutcome::DepthLimited) + self.count_outcome(RegionOutcome::RadiusFloor)
    }

    pub fn records_fetched(&self) -> usize {
        self.visits.iter().map(|v| v.fetched).sum()
    }

    pub fn new_records(&self) -> usize {
        self.visits.iter().map(|v| v.new_records).sum()
    }

    pub fn records_written(&self) -> usize {
        self.visits.iter().map(|v| v.written).sum()
    }

    pub fn max_depth_reached(&self) -> u32 {
        self.visits.iter().map(|v| v.depth).max().unwrap_or(0)
    }

    fn count_outcome(&self, outcome: RegionOutcome) -> usize {
        self.visits.iter().filter(|v| v.outcome == outcome).count()
    }
}

/// A region waiting to be queried.
struct PendingRegion {
    region: Region,
    depth: u32,
    direction: Option<Direction>,
}

/// What to do after a region was persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Refinement {
    Stop(RegionOutcome),
    Subdivide(Distance),
}

/// Decide whether a region with `new_records` new entities is refined.
pub fn plan_refinement(
    region: &Region,
    depth: u32,
    new_records: usize,
    config: &SamplerConfig,
) -> Refinement {
    if new_records < config.saturation_threshold {
        return Refinement::Stop(RegionOutcome::Terminal);
    }
    if depth >= config.max_depth {
        return Refinement::Stop(RegionOutcome::DepthLimited);
    }
    let refined = region.radius.refined();
    if refined.as_meters() < config.min_radius_m {
        return Refinement::Stop(RegionOutcome::RadiusFloor);
    }
    Refinement::Subdivide(refined)
}

/// Search `region` and every saturated sub-region.
///
/// `registry` decides which entities count as new for this run; pass a fresh
/// one per root search. Store errors abort the search and are returned.
pub async fn search<D, S>(
    source: &D,
    store: &S,
    registry: &mut DedupRegistry,
    category: &str,
    region: Region,
    config: &SamplerConfig,
) -> Result<SearchReport>
where
    D: DataSource + ?Sized,
    S: EntityStore + ?Sized,
{
    config.validate()?;
    region.validate()?;

    let mut report = SearchReport::default();
    // Children are pushed in reverse so they pop in N, S, E, W order.
    let mut pending = vec![PendingRegion {
        region,
        depth: 0,
        direction: None,
    }];

    while let Some(PendingRegion {
        region,
        depth,
        direction,
    }) = pending.pop()
    {
        let query = query_for_region(category, &region);
        info!(depth, source = source.name(), query = %query.query_text(), "Searching region");

        let fetched = match source.fetch_entities(&query).await {
            Ok(records) => records,
            Err(e) => {
                warn!(depth, region = %region, error = %e, "Region query failed, skipping branch");
                report.visits.push(RegionVisit {
                    depth,
                    direction,
                    region,
                    fetched: 0,
                    new_records: 0,
                    written: 0,
                    outcome: RegionOutcome::Failed,
                });
                continue;
            }
        };

        let fetched_count = fetched.len();
        let fresh = registry.admit(fetched);
        let written = store.append_new(&fresh).await?;

        let outcome = match plan_refinement(&region, depth, fresh.len(), config) {
            Refinement::Stop(outcome) => {
                match outcome {
                    RegionOutcome::DepthLimited => warn!(
                        depth,
                        region = %region,
                        new_records = fresh.len(),
                        "Region still saturated at maximum depth"
                    ),
                    RegionOutcome::RadiusFloor => warn!(
                        depth,
                        region = %region,
                        new_records = fresh.len(),
                        "Region still saturated at minimum radius"
                    ),
                    _ => debug!(depth, new_records = fresh.len(), "Region terminal"),
                }
                outcome
            }
            Refinement::Subdivide(new_radius) => {
                info!(depth, radius = %region.radius, new_radius = %new_radius, "Refining search area");
                for (direction, child) in child_regions(&region, new_radius).into_iter().rev() {
                    pending.push(PendingRegion {
                        region: child,
                        depth: depth + 1,
                        direction: Some(direction),
                    });
                }
                RegionOutcome::Subdivided
            }
        };

        report.visits.push(RegionVisit {
            depth,
            direction,
            region,
            fetched: fetched_count,
            new_records: fresh.len(),
            written,
            outcome,
        });
    }

    info!(
        regions = report.regions_queried(),
        failed = report.regions_failed(),
        new_records = report.new_records(),
        written = report.records_written(),
        store = %store.location(),
        "Search complete"
    );
    Ok(report)
}

/// Run a root search as described by `request`, persisting to its store path.
pub async fn run_search<D>(source: &D, request: &SearchRequest) -> Result<SearchReport>
where
    D: DataSource + ?Sized,
{
    request.validate()?;

    let store = JsonFileStore::new(&request.store_path);
    let mut registry = DedupRegistry::new();
    search(
        source,
        &store,
        &mut registry,
        &request.category,
        request.region(),
        &request.config,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SamplerError, StoreError};
    use crate::sources::MockDataSource;
    use crate::stores::MemoryStore;
    use crate::testing::{numbered_entities, FailingStore};
    use crate::types::region::Coordinates;

    fn root() -> Region {
        Region::new(
            Coordinates::new(41.8781, -87.6298).unwrap(),
            Distance::kilometers(5.0).unwrap(),
        )
    }

    fn config(threshold: usize) -> SamplerConfig {
        SamplerConfig::new().with_saturation_threshold(threshold)
    }

    #[tokio::test]
    async fn test_non_positive_root_radius_is_never_queried() {
        for value in [0.0, -2.0, f64::NAN] {
            let source = MockDataSource::new().respond_with(numbered_entities("root", 3));
            let store = MemoryStore::new();
            let mut registry = DedupRegistry::new();
            let mut region = root();
            region.radius.value = value;

            let err = search(&source, &store, &mut registry, "factories", region, &config(10))
                .await
                .unwrap_err();

            assert!(matches!(err, SamplerError::InvalidRegion { .. }));
            assert_eq!(source.call_count(), 0);
            assert_eq!(store.append_call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_just_below_threshold_is_terminal() {
        let source = MockDataSource::new().respond_with(numbered_entities("root", 9));
        let store = MemoryStore::new();
        let mut registry = DedupRegistry::new();

        let report = search(&source, &store, &mut registry, "factories", root(), &config(10))
            .await
            .unwrap();

        assert_eq!(source.call_count(), 1);
        assert_eq!(report.visits[0].outcome, RegionOutcome::Terminal);
        assert_eq!(store.len(), 9);
    }

    #[tokio::test]
    async fn test_at_threshold_subdivides_into_four() {
        let source = MockDataSource::new().respond_with(numbered_entities("root", 10));
        let store = MemoryStore::new();
        let mut registry = DedupRegistry::new();

        let report = search(&source, &store, &mut registry, "factories", root(), &config(10))
            .await
            .unwrap();

        assert_eq!(report.visits[0].outcome, RegionOutcome::Subdivided);
        assert_eq!(source.call_count(), 5);
        let children: Vec<Option<Direction>> =
            report.visits[1..].iter().map(|v| v.direction).collect();
        assert_eq!(
            children,
            Direction::ALL.iter().copied().map(Some).collect::<Vec<_>>()
        );
        for visit in &report.visits[1..] {
            assert_eq!(visit.depth, 1);
            assert_eq!(visit.region.radius, Distance::kilometers(2.5).unwrap());
        }
    }

    #[tokio::test]
    async fn test_children_visited_depth_first() {
        // Root and its north child saturate; the north child's children must
        // all be visited before the root's south child.
        let source = MockDataSource::new()
            .respond_with(numbered_entities("root", 2))
            .respond_with(numbered_entities("n", 2));
        let store = MemoryStore::new();
        let mut registry = DedupRegistry::new();

        let report = search(&source, &store, &mut registry, "factories", root(), &config(2))
            .await
            .unwrap();

        let trail: Vec<(u32, Option<Direction>)> =
            report.visits.iter().map(|v| (v.depth, v.direction)).collect();
        assert_eq!(
            trail,
            vec![
                (0, None),
                (1, Some(Direction::North)),
                (2, Some(Direction::North)),
                (2, Some(Direction::South)),
                (2, Some(Direction::East)),
                (2, Some(Direction::West)),
                (1, Some(Direction::South)),
                (1, Some(Direction::East)),
                (1, Some(Direction::West)),
            ]
        );
    }

    #[tokio::test]
    async fn test_depth_limit_forces_terminal() {
        let source = MockDataSource::new().with_handler(|_, index| {
            Ok(numbered_entities(&format!("call{index}"), 5))
        });
        let store = MemoryStore::new();
        let mut registry = DedupRegistry::new();
        let config = config(5).with_max_depth(2);

        let report = search(&source, &store, &mut registry, "factories", root(), &config)
            .await
            .unwrap();

        // 1 + 4 + 16 regions; everything at depth 2 is cut short.
        assert_eq!(report.regions_queried(), 21);
        assert_eq!(report.max_depth_reached(), 2);
        assert_eq!(report.regions_cut_short(), 16);
        assert!(report
            .visits
            .iter()
            .filter(|v| v.depth == 2)
            .all(|v| v.outcome == RegionOutcome::DepthLimited));
    }

    #[tokio::test]
    async fn test_radius_floor_forces_terminal() {
        let source = MockDataSource::new().with_handler(|_, index| {
            Ok(numbered_entities(&format!("call{index}"), 3))
        });
        let store = MemoryStore::new();
        let mut registry = DedupRegistry::new();
        let region = Region::new(
            Coordinates::new(0.0, 0.0).unwrap(),
            Distance::meters(80.0).unwrap(),
        );
        let config = config(3).with_min_radius_m(25.0).with_max_depth(50);

        let report = search(&source, &store, &mut registry, "cafes", region, &config)
            .await
            .unwrap();

        // 80 m -> 40 m children -> 20 m would be below the floor.
        assert_eq!(report.regions_queried(), 5);
        assert!(report.visits[1..]
            .iter()
            .all(|v| v.outcome == RegionOutcome::RadiusFloor));
    }

    #[tokio::test]
    async fn test_source_failure_only_ends_its_branch() {
        let source = MockDataSource::new()
            .respond_with(numbered_entities("root", 4))
            .fail_with("page did not load")
            .respond_with(numbered_entities("south", 1));
        let store = MemoryStore::new();
        let mut registry = DedupRegistry::new();

        let report = search(&source, &store, &mut registry, "factories", root(), &config(4))
            .await
            .unwrap();

        assert_eq!(report.regions_queried(), 5);
        assert_eq!(report.regions_failed(), 1);
        assert_eq!(report.visits[1].outcome, RegionOutcome::Failed);
        assert_eq!(store.len(), 5);
    }

    #[tokio::test]
    async fn test_store_failure_aborts_run() {
        let source = MockDataSource::new().with_handler(|_, index| {
            Ok(numbered_entities(&format!("call{index}"), 20))
        });
        let mut registry = DedupRegistry::new();

        let store = FailingStore::new("/readonly/results.json");

        let err = search(&source, &store, &mut registry, "factories", root(), &config(10))
            .await
            .unwrap_err();

        assert!(matches!(err, SamplerError::Store(StoreError::Write { .. })));
        assert!(err.to_string().contains("/readonly/results.json"));
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_persist_called_even_when_nothing_new() {
        let source = MockDataSource::new().respond_with(vec![]);
        let store = MemoryStore::new();
        let mut registry = DedupRegistry::new();

        search(&source, &store, &mut registry, "factories", root(), &config(1))
            .await
            .unwrap();

        assert_eq!(store.append_call_count(), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_known_entities_do_not_count_toward_saturation() {
        let source = MockDataSource::new().respond_with(numbered_entities("seen", 10));
        let store = MemoryStore::new();
        let mut registry = DedupRegistry::new();
        for record in numbered_entities("seen", 10) {
            registry.add(record.name.clone(), record);
        }

        let report = search(&source, &store, &mut registry, "factories", root(), &config(10))
            .await
            .unwrap();

        assert_eq!(report.visits[0].new_records, 0);
        assert_eq!(report.visits[0].outcome, RegionOutcome::Terminal);
    }

    #[tokio::test]
    async fn test_entities_already_on_disk_still_count_as_new_for_run() {
        let source = MockDataSource::new().respond_with(numbered_entities("old", 10));
        let store = MemoryStore::with_records(numbered_entities("old", 10));
        let mut registry = DedupRegistry::new();

        let report = search(&source, &store, &mut registry, "factories", root(), &config(10))
            .await
            .unwrap();

        assert_eq!(report.visits[0].new_records, 10);
        assert_eq!(report.visits[0].written, 0);
        assert_eq!(report.visits[0].outcome, RegionOutcome::Subdivided);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_querying() {
        let source = MockDataSource::new();
        let store = MemoryStore::new();
        let mut registry = DedupRegistry::new();

        let err = search(&source, &store, &mut registry, "factories", root(), &config(0))
            .await
            .unwrap_err();

        assert!(matches!(err, SamplerError::InvalidConfig { .. }));
        assert_eq!(source.call_count(), 0);
    }

    #[test]
    fn test_plan_refinement_uses_refined_radius() {
        let config = config(1);
        let region = Region::new(
            Coordinates::new(0.0, 0.0).unwrap(),
            Distance::kilometers(1.0).unwrap(),
        );
        assert_eq!(
            plan_refinement(&region, 0, 1, &config),
            Refinement::Subdivide(Distance::meters(1000.0).unwrap())
        );
        assert_eq!(
            plan_refinement(&region, 0, 0, &config),
            Refinement::Stop(RegionOutcome::Terminal)
        );
    }
}
