use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{error, info};

use crate::error::SweepError;
use crate::report::{SweepReport, SweeperResult};
use crate::service_attachment::ComputeServiceAttachmentSweeper;
use crate::sweeper::Sweep;

/// Named sweepers and the order they must run in.
#[derive(Default, Clone)]
pub struct SweeperRegistry {
    sweepers: BTreeMap<&'static str, Arc<dyn Sweep>>,
}

impl SweeperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every sweeper this crate ships, configured from the environment.
    pub fn builtin() -> Result<Self, SweepError> {
        let mut registry = Self::new();
        registry.add_sweeper(Arc::new(ComputeServiceAttachmentSweeper::new()))?;
        Ok(registry)
    }

    /// Register a sweeper. Returns `&mut self` for chaining.
    pub fn add_sweeper(&mut self, sweeper: Arc<dyn Sweep>) -> Result<&mut Self, SweepError> {
        let name = sweeper.name();
        if self.sweepers.contains_key(name) {
            return Err(SweepError::DuplicateSweeper(name.to_string()));
        }
        self.sweepers.insert(name, sweeper);
        Ok(self)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.sweepers.keys().copied().collect()
    }

    /// Run a single sweeper, without its dependencies. Errors are returned unchanged.
    pub async fn run_sweeper(&self, name: &str, region: &str) -> Result<Vec<String>, SweepError> {
        let sweeper = self
            .sweepers
            .get(name)
            .ok_or_else(|| SweepError::UnknownSweeper(name.to_string()))?;
        sweeper.sweep(region).await
    }

    /// Run the selected sweepers (all when `filter` is empty) plus their
    /// dependencies, dependencies first. A failing sweeper is recorded in the
    /// report and the rest still run.
    pub async fn run_sweepers(
        &self,
        region: &str,
        filter: &[String],
    ) -> Result<SweepReport, SweepError> {
        let order = self.execution_order(filter)?;
        let mut report = SweepReport::new(region);

        for name in order {
            info!(sweeper = name, region, "running sweeper");
            let result = match self.run_sweeper(name, region).await {
                Ok(deleted) => SweeperResult {
                    name: name.to_string(),
                    deleted,
                    error: None,
                },
                Err(e) => {
                    error!(sweeper = name, region, "sweeper failed: {}", e);
                    SweeperResult {
                        name: name.to_string(),
                        deleted: Vec::new(),
                        error: Some(e.to_string()),
                    }
                }
            };
            report.results.push(result);
        }
        Ok(report)
    }

    /// Dependency-first order of the selected sweepers.
    pub fn execution_order(&self, filter: &[String]) -> Result<Vec<&'static str>, SweepError> {
        let roots: Vec<&'static str> = if filter.is_empty() {
            self.names()
        } else {
            filter
                .iter()
                .map(|f| {
                    self.sweepers
                        .get_key_value(f.as_str())
                        .map(|(k, _)| *k)
                        .ok_or_else(|| SweepError::UnknownSweeper(f.clone()))
                })
                .collect::<Result<_, _>>()?
        };

        // Selected sweepers plus everything they depend on.
        let mut selected: Vec<&'static str> = Vec::new();
        let mut pending = roots;
        while let Some(name) = pending.pop() {
            if selected.contains(&name) {
                continue;
            }
            let sweeper = self
                .sweepers
                .get(name)
                .ok_or_else(|| SweepError::UnknownSweeper(name.to_string()))?;
            for dep in sweeper.dependencies() {
                let Some((dep, _)) = self.sweepers.get_key_value(dep) else {
                    return Err(SweepError::UnknownDependency {
                        sweeper: name.to_string(),
                        dependency: dep.to_string(),
                    });
                };
                pending.push(*dep);
            }
            selected.push(name);
        }
        selected.sort_unstable();

        // Edge dependency → dependent: the dependency is swept first.
        let mut graph: DiGraph<&'static str, ()> = DiGraph::new();
        let nodes: HashMap<&'static str, NodeIndex> = selected
            .iter()
            .map(|name| (*name, graph.add_node(*name)))
            .collect();
        for name in &selected {
            for dep in self.sweepers[name].dependencies() {
                graph.add_edge(nodes[dep], nodes[name], ());
            }
        }

        let order = toposort(&graph, None)
            .map_err(|cycle| SweepError::DependencyCycle(graph[cycle.node_id()].to_string()))?;
        Ok(order.into_iter().map(|idx| graph[idx]).collect())
    }
}
