//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When the
//! migrations change, regenerate with `diesel print-schema` or update by
//! hand.

diesel::table! {
    /// Physical cash registers.
    cash_registers (id) {
        id -> Uuid,
        #[max_length = 64]
        name -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Open/close cycles of a register.
    ///
    /// A partial unique index on `register_id WHERE closed_at IS NULL`
    /// guarantees one open session per register. The three closure columns
    /// are either all null or all set.
    cash_sessions (id) {
        id -> Uuid,
        register_id -> Uuid,
        opened_by -> Uuid,
        opened_at -> Timestamptz,
        initial_amount -> Numeric,
        closed_at -> Nullable<Timestamptz>,
        closed_by -> Nullable<Uuid>,
        counted_amount -> Nullable<Numeric>,
    }
}

diesel::table! {
    /// Expenses taken from the drawer during a session.
    cash_expenses (id) {
        id -> Uuid,
        /// Insertion sequence used to break `recorded_at` ties.
        seq -> Int8,
        session_id -> Uuid,
        #[max_length = 200]
        concept -> Varchar,
        amount -> Numeric,
        recorded_by -> Uuid,
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Sales attributed to a session by the sales subsystem.
    cash_session_sales (id) {
        id -> Uuid,
        session_id -> Uuid,
        amount -> Numeric,
        recorded_at -> Timestamptz,
    }
}

diesel::joinable!(cash_sessions -> cash_registers (register_id));
diesel::joinable!(cash_expenses -> cash_sessions (session_id));
diesel::joinable!(cash_session_sales -> cash_sessions (session_id));

diesel::allow_tables_to_appear_in_same_query!(
    cash_registers,
    cash_sessions,
    cash_expenses,
    cash_session_sales,
);
