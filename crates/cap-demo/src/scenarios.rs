//! Demonstration scenarios
//!
//! Each scenario drives one mechanism through the capability contract and
//! reports what a console client would print. Reports are serializable so
//! the binary can emit them as JSON instead.

use crate::domain::{
    concrete_component, decorator_a, decorator_b, leaf, pizza_factory, toppings, AnimalChain,
};
use crate::error::DemoError;
use cap_core::{CacheConfig, Node, NodeRef, RuntimeConfig};
use cap_dispatch::{Dispatch, DispatchError, HandlerRef};
use cap_flyweight::{CacheError, CacheStats};
use cap_structure::{Composite, StructureError, WrapStack, Wrapper};
use serde::Serialize;
use std::sync::Arc;

/// Scenario selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Tree aggregation
    Composite,
    /// Transparent wrapping
    Decorator,
    /// Ordered fallback dispatch
    Chain,
    /// Keyed shared instances
    Flyweight,
    /// Every scenario in order
    All,
}

impl Scenario {
    /// Parse a subcommand name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "composite" => Some(Self::Composite),
            "decorator" => Some(Self::Decorator),
            "chain" => Some(Self::Chain),
            "flyweight" => Some(Self::Flyweight),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Lines printed by the composite scenario
pub fn composite_lines(config: &RuntimeConfig) -> Result<Vec<String>, StructureError> {
    let leaf1 = leaf("Leaf 1");
    let leaf2 = leaf("Leaf 2");

    let composite: Arc<Composite> = Arc::new(Composite::with_config(&config.composite));
    composite.add(Arc::clone(&leaf1))?;
    composite.add(Arc::clone(&leaf2))?;

    let empty: NodeRef = Arc::new(Composite::<()>::with_config(&config.composite));
    let nodes: [NodeRef; 4] = [leaf1, leaf2, composite, empty];

    Ok(nodes
        .iter()
        .map(|node| format!("Result: {}", node.operation(&())))
        .collect())
}

/// Lines printed by the decorator scenario
#[must_use]
pub fn decorator_lines() -> Vec<String> {
    let decorated_a = WrapStack::new(concrete_component()).wrap(decorator_a()).build();
    let decorated_b = Wrapper::new(Arc::clone(&decorated_a), decorator_b());

    vec![decorated_a.operation(&()), decorated_b.operation(&())]
}

/// Foods offered to every chain entry point
pub const FOODS: [&str; 3] = ["Nut", "Banana", "Cup of coffee"];

/// One food offered to one entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoodAnswer {
    /// Request
    pub food: String,
    /// What the chain did with it
    pub dispatch: Dispatch<String>,
}

/// All foods offered to one entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainRun {
    /// Heading, e.g. `Chain: Monkey > Squirrel > Dog`
    pub heading: String,
    /// Handler names from the entry point forward
    pub handlers: Vec<String>,
    /// Answers in offering order
    pub answers: Vec<FoodAnswer>,
}

/// Chain scenario result: the full chain, then the subchain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainReport {
    /// Runs in order
    pub runs: Vec<ChainRun>,
}

impl ChainReport {
    /// Console rendering
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (i, run) in self.runs.iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            lines.push(run.heading.clone());
            lines.push(String::new());
            for answer in &run.answers {
                lines.push(format!("Client: Who wants a {}?", answer.food));
                match answer.dispatch.outcome() {
                    Some(outcome) => lines.push(format!("  {outcome}")),
                    None => lines.push(format!("  {} was left untouched.", answer.food)),
                }
            }
        }
        lines
    }
}

/// Run the chain scenario from the head and from the `Squirrel` subchain
pub fn chain_report() -> Result<ChainReport, DispatchError> {
    let chain = AnimalChain::linked()?;
    let runs = vec![
        offer("Chain", &chain.monkey),
        offer("Subchain", &chain.squirrel),
    ];
    Ok(ChainReport { runs })
}

fn offer(kind: &str, entry: &HandlerRef) -> ChainRun {
    let handlers = entry.chain_names();
    let heading = format!("{kind}: {}", handlers.join(" > "));
    let answers = FOODS
        .iter()
        .map(|food| FoodAnswer {
            food: (*food).to_string(),
            dispatch: entry.handle(&(*food).to_string()),
        })
        .collect();
    ChainRun {
        heading,
        handlers,
        answers,
    }
}

/// Flyweight scenario result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlyweightReport {
    /// Served pizzas in order
    pub served: Vec<String>,
    /// Whether a repeated shared lookup returned the identical instance
    pub shared_identity: bool,
    /// Whether two identical unshared requests returned distinct instances
    pub unshared_distinct: bool,
    /// Registry counters after the run
    pub stats: CacheStats,
}

impl FlyweightReport {
    /// Console rendering
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = self.served.clone();
        lines.push(format!(
            "Cache: {} shared, {} hits, {} misses, {} unshared",
            self.stats.entries, self.stats.hits, self.stats.misses, self.stats.unshared_built
        ));
        lines
    }
}

/// Serve two shared pizzas and one custom pizza
pub fn flyweight_report(config: &CacheConfig) -> Result<FlyweightReport, CacheError> {
    let factory = pizza_factory().with_config(config.clone());

    let margherita = factory.shared(["Thin Crust", "Tomato Sauce"])?;
    let pepperoni = factory.shared(["Thick Crust", "BBQ Sauce"])?;
    let custom = factory.unshared("Gluten-Free Base with Vegan Cheese");

    let served = vec![
        margherita.serve(&toppings(&["Mozzarella", "Basil"])),
        pepperoni.serve(&toppings(&["Pepperoni", "Olives"])),
        custom.serve(&toppings(&["Spinach", "Mushrooms"])),
    ];

    let shared_identity = Arc::ptr_eq(&margherita, &factory.shared(["Thin Crust", "Tomato Sauce"])?);
    let unshared_distinct = !Arc::ptr_eq(
        &factory.unshared("Gluten-Free Base with Vegan Cheese"),
        &factory.unshared("Gluten-Free Base with Vegan Cheese"),
    );

    Ok(FlyweightReport {
        served,
        shared_identity,
        unshared_distinct,
        stats: factory.stats(),
    })
}

/// Render `scenario` as console text or JSON
///
/// # Errors
/// Whatever the selected scenarios fail with, or a JSON conversion error.
pub fn render(scenario: Scenario, config: &RuntimeConfig, json: bool) -> Result<String, DemoError> {
    let selected = match scenario {
        Scenario::All => vec![
            Scenario::Composite,
            Scenario::Decorator,
            Scenario::Chain,
            Scenario::Flyweight,
        ],
        single => vec![single],
    };

    let mut text = Vec::with_capacity(selected.len());
    let mut values = serde_json::Map::new();
    for single in selected {
        let (name, value, lines) = section(single, config)?;
        values.insert(name.to_string(), value);
        text.push(lines.join("\n"));
    }

    if !json {
        return Ok(text.join("\n\n"));
    }
    let value = if scenario == Scenario::All {
        serde_json::Value::Object(values)
    } else {
        values.into_iter().next().map(|(_, v)| v).unwrap_or_default()
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

fn section(
    scenario: Scenario,
    config: &RuntimeConfig,
) -> Result<(&'static str, serde_json::Value, Vec<String>), DemoError> {
    tracing::debug!(?scenario, "running scenario");
    Ok(match scenario {
        Scenario::Composite => {
            let lines = composite_lines(config)?;
            ("composite", serde_json::to_value(&lines)?, lines)
        }
        Scenario::Decorator => {
            let lines = decorator_lines();
            ("decorator", serde_json::to_value(&lines)?, lines)
        }
        Scenario::Chain => {
            let report = chain_report()?;
            ("chain", serde_json::to_value(&report)?, report.lines())
        }
        Scenario::Flyweight => {
            let report = flyweight_report(&config.cache)?;
            ("flyweight", serde_json::to_value(&report)?, report.lines())
        }
        Scenario::All => return Err(DemoError::NotSingle(scenario)),
    })
}
