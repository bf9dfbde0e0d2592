mod common;

mod cycle_scenarios;
