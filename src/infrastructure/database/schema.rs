// The lecture_chunks_{width} tables are reached through dimension-keyed raw
// SQL (see `queries`), so only the single-width graph_rag tables are declared.

diesel::table! {
    use diesel::sql_types::*;
    use pgvector::sql_types::*;

    graph_rag.documents (id) {
        id -> Int8,
        content -> Text,
        embedding -> Nullable<Vector>,
        metadata -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    use diesel::sql_types::*;

    graph_rag.document_nodes (id) {
        id -> Int8,
        document_id -> Int8,
        node_id -> Int8,
        node_type -> Text,
        properties -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(document_nodes -> documents (document_id));

diesel::allow_tables_to_appear_in_same_query!(documents, document_nodes,);
