pub mod alert_evaluator;
