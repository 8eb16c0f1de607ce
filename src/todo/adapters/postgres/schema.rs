//! Diesel schema for todo persistence.

diesel::table! {
    /// Todo records.
    todos (id) {
        /// Storage-assigned identifier.
        id -> Int8,
        /// Todo title.
        #[max_length = 150]
        title -> Varchar,
        /// Todo description.
        #[max_length = 500]
        description -> Varchar,
        /// Todo category, `default` when not supplied.
        #[max_length = 50]
        category -> Varchar,
        /// Insert timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Completion timestamp, null while pending.
        done_at -> Nullable<Timestamptz>,
    }
}
