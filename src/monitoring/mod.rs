pub mod trial_report;
