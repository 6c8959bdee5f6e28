pub mod custom_date_serde;
