// Mirrors the DDL in `ddl.rs`. Neither table has a primary key in the database;
// `id` is declared here only because diesel requires one.

diesel::table! {
    use diesel::sql_types::*;

    risk (id) {
        id -> Nullable<Int8>,
        rdate -> Nullable<Date>,
        #[max_length = 100]
        industry -> Nullable<Varchar>,
        mean_sent -> Nullable<Float8>,
        #[sql_name = "risk"]
        risk_score -> Nullable<Float8>,
        predict -> Nullable<Float8>,
        total_news -> Int4,
        article_ratio -> Numeric,
        total_volume -> Int8,
        trade_volume_ratio -> Numeric,
    }
}

diesel::table! {
    use diesel::sql_types::*;

    stock (id) {
        id -> Nullable<Int8>,
        sdate -> Nullable<Date>,
        #[max_length = 100]
        market_index -> Nullable<Varchar>,
        close -> Nullable<Float8>,
        change -> Nullable<Float8>,
        volume -> Nullable<Int8>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(risk, stock,);
