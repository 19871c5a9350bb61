pub const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY,
        url TEXT NOT NULL,
        img_file TEXT NOT NULL,
        description TEXT NOT NULL,
        prices TEXT
    );",
    "CREATE TABLE IF NOT EXISTS decisions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id INTEGER NOT NULL,
        product_id INTEGER NOT NULL,
        label TEXT NOT NULL,
        decided_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_decisions_session ON decisions(session_id, id);",
];
