// Kept in sync with `PROVISION_SCHEMA_SQL` in `db/mod.rs`.

diesel::table! {
    countries (name_key) {
        name_key -> Text,
        name -> Text,
        capital -> Nullable<Text>,
        region -> Nullable<Text>,
        population -> Int8,
        currency_code -> Nullable<Text>,
        exchange_rate -> Nullable<Float8>,
        estimated_gdp -> Nullable<Float8>,
        flag_url -> Nullable<Text>,
        last_refreshed_at -> Timestamptz,
    }
}
