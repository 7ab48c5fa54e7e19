mod concurrency_tests;
mod graph_property_tests;
mod path_scenario_tests;
mod snapshot_restore_tests;
