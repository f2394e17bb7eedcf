//! Sample domains used by the scenarios
//!
//! The names (components, animals, pizzas) are illustrative labels only.

use cap_core::{Leaf, NodeRef};
use cap_dispatch::{DispatchError, Exact, Handler, HandlerRef};
use cap_flyweight::{CacheError, CacheKey, Flyweight, FlyweightFactory};
use cap_structure::TagLayer;
use std::sync::Arc;

/// Text leaf `Leaf: <name>`
#[must_use]
pub fn leaf(name: &str) -> NodeRef {
    Arc::new(Leaf::named(name))
}

/// The undecorated component
#[must_use]
pub fn concrete_component() -> NodeRef {
    Arc::new(Leaf::new(
        "ConcreteComponent",
        "ConcreteComponent operation".to_string(),
    ))
}

/// First decorating layer
#[must_use]
pub fn decorator_a() -> TagLayer {
    TagLayer::new("ConcreteDecoratorA", "with additional behavior A")
}

/// Second decorating layer
#[must_use]
pub fn decorator_b() -> TagLayer {
    TagLayer::new("ConcreteDecoratorB", "with additional behavior B")
}

/// Handler that eats exactly one food
#[must_use]
pub fn feeder(animal: &str, food: &str) -> HandlerRef {
    Handler::shared(
        animal,
        Exact::new(food.to_string(), format!("{animal}: I'll eat the {food}.")),
    )
}

/// Handlers of the `Monkey > Squirrel > Dog` chain
#[derive(Debug, Clone)]
pub struct AnimalChain {
    /// Eats bananas
    pub monkey: HandlerRef,
    /// Eats nuts
    pub squirrel: HandlerRef,
    /// Eats meatballs
    pub dog: HandlerRef,
}

impl AnimalChain {
    /// Build and link `Monkey > Squirrel > Dog`
    pub fn linked() -> Result<Self, DispatchError> {
        let chain = Self::unlinked();
        chain
            .monkey
            .set_next(Arc::clone(&chain.squirrel))?
            .set_next(Arc::clone(&chain.dog))?;
        Ok(chain)
    }

    /// The three handlers with no links
    #[must_use]
    pub fn unlinked() -> Self {
        Self {
            monkey: feeder("Monkey", "Banana"),
            squirrel: feeder("Squirrel", "Nut"),
            dog: feeder("Dog", "MeatBall"),
        }
    }
}

/// Pizza instances share this contract; toppings are extrinsic state
pub type Pizza = dyn Flyweight<[String]>;

/// Shared pizza: intrinsic base and sauce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PizzaBase {
    base: String,
    sauce: String,
}

impl PizzaBase {
    /// Create base
    #[must_use]
    pub fn new(base: impl Into<String>, sauce: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            sauce: sauce.into(),
        }
    }
}

impl Flyweight<[String]> for PizzaBase {
    fn serve(&self, toppings: &[String]) -> String {
        format!(
            "Pizza with base: {}, sauce: {}, toppings: {}",
            self.base,
            self.sauce,
            toppings.join(", ")
        )
    }
}

/// Unshared pizza: a one-off special order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomPizza {
    description: String,
}

impl CustomPizza {
    /// Create custom pizza
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

impl Flyweight<[String]> for CustomPizza {
    fn serve(&self, toppings: &[String]) -> String {
        format!(
            "Custom Pizza: {}, toppings: {}",
            self.description,
            toppings.join(", ")
        )
    }
}

/// Factory keyed by `(base, sauce)`, building custom pizzas on the unshared path
#[must_use]
pub fn pizza_factory() -> FlyweightFactory<Pizza> {
    FlyweightFactory::new(
        |key: &CacheKey| -> Result<Arc<Pizza>, CacheError> {
            match key.parts() {
                [base, sauce] => Ok(Arc::new(PizzaBase::new(base.as_str(), sauce.as_str()))),
                _ => Err(CacheError::build(
                    key.to_string(),
                    format!("expected base and sauce, got {} parts", key.arity()),
                )),
            }
        },
        |description: &str| -> Arc<Pizza> { Arc::new(CustomPizza::new(description)) },
    )
}

/// Owned toppings list from string literals
#[must_use]
pub fn toppings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}
