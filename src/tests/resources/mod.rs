mod assistant_tests;
mod metric_property_tests;
mod session_tests;
