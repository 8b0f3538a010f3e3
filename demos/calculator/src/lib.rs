//! Calculator scenarios demonstrating inter-scenario dependencies.
//!
//! `CalculatorFeature` holds a dependency scenario (`AddTwoNumbers`), a
//! scenario depending on it (`UseSum`) and an outline. The failing variant
//! breaks the dependency's assertion to show how the failure reaches its
//! dependents while unrelated scenarios keep passing.

use scenario_deps_harness::{
    ExampleRow, GroupDefinition, ScenarioContext, ScenarioDefinition, ScenarioError, ScenarioHook,
    ScenarioHost, register_group,
};

/// Two operands and the last result.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Calculator {
    first: i64,
    second: i64,
    result: i64,
}

impl Calculator {
    /// Create a calculator with both operands at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the first operand.
    pub fn set_first(&mut self, number: i64) {
        self.first = number;
    }

    /// Set the second operand.
    pub fn set_second(&mut self, number: i64) {
        self.second = number;
    }

    /// Add the operands, storing the sum as the result.
    pub fn add(&mut self) {
        self.result = self.first.saturating_add(self.second);
    }

    /// The last computed result.
    #[must_use]
    pub fn result(&self) -> i64 {
        self.result
    }
}

fn given_the_first_number_is(ctx: &mut ScenarioContext, number: i64) {
    ctx.get_or_default::<Calculator>().set_first(number);
}

fn given_the_second_number_is(ctx: &mut ScenarioContext, number: i64) {
    ctx.get_or_default::<Calculator>().set_second(number);
}

fn when_the_two_numbers_are_added(ctx: &mut ScenarioContext) {
    ctx.get_or_default::<Calculator>().add();
}

fn then_the_result_should_be(ctx: &mut ScenarioContext, expected: i64) {
    let result = ctx.get_or_default::<Calculator>().result();
    assert_eq!(result, expected, "the result should be {expected}");
}

fn add_and_check(ctx: &mut ScenarioContext, first: i64, second: i64, expected: i64) {
    given_the_first_number_is(ctx, first);
    given_the_second_number_is(ctx, second);
    when_the_two_numbers_are_added(ctx);
    then_the_result_should_be(ctx, expected);
}

fn integer_argument(ctx: &ScenarioContext, name: &str) -> Result<i64, ScenarioError> {
    let value = ctx
        .argument(name)
        .ok_or_else(|| ScenarioError::skip(format!("missing example column '{name}'")))?;
    value.parse().map_err(ScenarioError::failed)
}

fn add_two_numbers(ctx: &mut ScenarioContext) -> Result<(), ScenarioError> {
    add_and_check(ctx, 2, 3, 5);
    Ok(())
}

fn add_two_numbers_wrongly(ctx: &mut ScenarioContext) -> Result<(), ScenarioError> {
    add_and_check(ctx, 2, 3, 99);
    Ok(())
}

fn use_sum(ctx: &mut ScenarioContext) -> Result<(), ScenarioError> {
    add_and_check(ctx, 50, 70, 120);
    Ok(())
}

fn add_examples(ctx: &mut ScenarioContext) -> Result<(), ScenarioError> {
    let first = integer_argument(ctx, "first")?;
    let second = integer_argument(ctx, "second")?;
    let result = integer_argument(ctx, "result")?;
    add_and_check(ctx, first, second, result);
    Ok(())
}

static ADD_EXAMPLES: [ExampleRow; 2] = [
    &[("first", "1"), ("second", "2"), ("result", "3")],
    &[("first", "-4"), ("second", "4"), ("result", "0")],
];

static CALCULATOR_SCENARIOS: [ScenarioDefinition; 3] = [
    ScenarioDefinition::new("AddTwoNumbers", add_two_numbers)
        .with_title("Add two numbers")
        .with_tags(&["@dependency"]),
    ScenarioDefinition::new("UseSum", use_sum)
        .with_title("Use the sum")
        .with_tags(&["@dependsOn:AddTwoNumbers"]),
    ScenarioDefinition::new("AddNumbers", add_examples)
        .with_title("Add numbers")
        .with_examples(&ADD_EXAMPLES),
];

/// Calculator scenarios where the dependency passes.
pub static CALCULATOR_FEATURE: GroupDefinition =
    GroupDefinition::new("CalculatorFeature", &CALCULATOR_SCENARIOS).with_title("Calculator");

static FAILING_SCENARIOS: [ScenarioDefinition; 3] = [
    ScenarioDefinition::new("AddTwoNumbers", add_two_numbers_wrongly)
        .with_title("Add two numbers")
        .with_tags(&["@dependency"]),
    ScenarioDefinition::new("UseSum", use_sum)
        .with_title("Use the sum")
        .with_tags(&["@dependsOn:AddTwoNumbers"]),
    ScenarioDefinition::new("Independent", use_sum).with_title("Independent sum"),
];

/// Calculator scenarios where the dependency fails.
pub static FAILING_CALCULATOR_FEATURE: GroupDefinition =
    GroupDefinition::new("FailingCalculatorFeature", &FAILING_SCENARIOS)
        .with_title("Failing calculator");

register_group!(CALCULATOR_FEATURE);
register_group!(FAILING_CALCULATOR_FEATURE);

/// Logs every scenario start and end.
#[derive(Debug, Default)]
pub struct SampleHooks;

impl ScenarioHook for SampleHooks {
    fn before_scenario(&self, host: &mut dyn ScenarioHost) -> Result<(), ScenarioError> {
        if let Some(ctx) = host.current_scenario() {
            log::info!("before scenario: {}", ctx.metadata().scenario_title());
        }
        Ok(())
    }

    fn after_scenario(&self, host: &mut dyn ScenarioHost) {
        if let Some(ctx) = host.current_scenario() {
            log::info!("after scenario: {}", ctx.metadata().scenario_title());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculator_adds() {
        let mut calculator = Calculator::new();
        calculator.set_first(2);
        calculator.set_second(3);
        calculator.add();
        assert_eq!(calculator.result(), 5);
    }

    #[test]
    fn steps_share_the_context_calculator() {
        let mut ctx = ScenarioContext::new(&CALCULATOR_FEATURE, &CALCULATOR_SCENARIOS[0], Vec::new());
        assert!(add_two_numbers(&mut ctx).is_ok());
        assert_eq!(ctx.get::<Calculator>().map(Calculator::result), Some(5));
    }

    #[test]
    fn examples_parse_their_columns() {
        let mut ctx = ScenarioContext::new(
            &CALCULATOR_FEATURE,
            &CALCULATOR_SCENARIOS[2],
            vec![("first".into(), "x".into())],
        );
        assert!(add_examples(&mut ctx).is_err_and(|error| !error.is_skip()));
    }
}
