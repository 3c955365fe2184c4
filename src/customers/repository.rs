use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use tracing::debug;

use super::model::Customer;
use crate::config::settings::DATABASE_VERSION;
use crate::error::StoreError;

const CREATE_TABLE: &str = "CREATE TABLE Customers (
    _id INTEGER PRIMARY KEY NOT NULL,
    FirstName TEXT NOT NULL,
    LastName TEXT,
    Profession TEXT,
    CompanyName TEXT,
    PhoneNumber TEXT,
    Notes TEXT
);";

const SELECT_COLUMNS: &str =
    "SELECT _id, FirstName, LastName, Profession, CompanyName, PhoneNumber, Notes FROM Customers";

/// Columns a search term is matched against.
const SEARCH_COLUMNS: [&str; 5] = ["FirstName", "LastName", "Profession", "CompanyName", "PhoneNumber"];

/// Customer records in a single-table SQLite database.
pub struct CustomerRepository {
    conn: Connection,
}

impl CustomerRepository {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.migrate()?;
        Ok(repo)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        match self.version()? {
            0 => {
                debug!(version = DATABASE_VERSION, "creating customers schema");
                self.conn.execute_batch(CREATE_TABLE)?;
                self.conn.pragma_update(None, "user_version", DATABASE_VERSION)?;
                Ok(())
            }
            DATABASE_VERSION => Ok(()),
            found => Err(StoreError::UnsupportedVersion { found, expected: DATABASE_VERSION }),
        }
    }

    pub fn version(&self) -> Result<i32, StoreError> {
        Ok(self.conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
    }

    pub fn insert(&self, customer: &Customer) -> Result<i64, StoreError> {
        customer.validate()?;
        self.conn.execute(
            "INSERT INTO Customers (FirstName, LastName, Profession, CompanyName, PhoneNumber, Notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                customer.first_name,
                customer.last_name,
                customer.profession,
                customer.company_name,
                customer.phone_number,
                customer.notes,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update(&self, customer: &Customer) -> Result<(), StoreError> {
        let id = customer.id.ok_or(StoreError::MissingId)?;
        customer.validate()?;
        let changed = self.conn.execute(
            "UPDATE Customers SET FirstName = ?1, LastName = ?2, Profession = ?3,
             CompanyName = ?4, PhoneNumber = ?5, Notes = ?6 WHERE _id = ?7",
            params![
                customer.first_name,
                customer.last_name,
                customer.profession,
                customer.company_name,
                customer.phone_number,
                customer.notes,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let changed = self.conn.execute("DELETE FROM Customers WHERE _id = ?1", [id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    pub fn get(&self, id: i64) -> Result<Option<Customer>, StoreError> {
        let sql = format!("{SELECT_COLUMNS} WHERE _id = ?1");
        Ok(self.conn.query_row(&sql, [id], customer_from_row).optional()?)
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM Customers", [], |row| row.get(0))?)
    }

    /// Every whitespace-separated term must prefix-match one of the searchable
    /// columns. No query returns all customers. Ordered by first name.
    pub fn search(&self, query: Option<&str>) -> Result<Vec<Customer>, StoreError> {
        let terms: Vec<&str> = query.map(|q| q.split_whitespace().collect()).unwrap_or_default();

        let mut sql = SELECT_COLUMNS.to_string();
        let mut args: Vec<String> = Vec::with_capacity(terms.len() * SEARCH_COLUMNS.len());
        if !terms.is_empty() {
            let clause = SEARCH_COLUMNS
                .iter()
                .map(|col| format!("{col} LIKE ?"))
                .collect::<Vec<_>>()
                .join(" OR ");
            let conditions = vec![format!("({clause})"); terms.len()].join(" AND ");
            sql.push_str(" WHERE ");
            sql.push_str(&conditions);
            for term in &terms {
                args.extend(std::iter::repeat_n(format!("{term}%"), SEARCH_COLUMNS.len()));
            }
        }
        sql.push_str(" ORDER BY FirstName COLLATE NOCASE");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), customer_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn customer_from_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
    let text = |idx: usize| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
    };
    Ok(Customer {
        id: Some(row.get(0)?),
        first_name: text(1)?,
        last_name: text(2)?,
        profession: text(3)?,
        company_name: text(4)?,
        phone_number: text(5)?,
        notes: text(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> (tempfile::TempDir, CustomerRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = CustomerRepository::open(&dir.path().join("data").join("customers.db")).unwrap();
        (dir, repo)
    }

    fn customer(first: &str, last: &str, profession: &str, company: &str, phone: &str) -> Customer {
        Customer {
            last_name: last.into(),
            profession: profession.into(),
            company_name: company.into(),
            phone_number: phone.into(),
            ..Customer::new(first)
        }
    }

    #[test]
    fn new_database_gets_schema_version() {
        let (_dir, repo) = repo();
        assert_eq!(repo.version().unwrap(), DATABASE_VERSION);
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn newer_schema_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customers.db");
        let conn = Connection::open(&path).unwrap();
        conn.pragma_update(None, "user_version", 9).unwrap();
        drop(conn);

        match CustomerRepository::open(&path) {
            Err(StoreError::UnsupportedVersion { found, expected }) => {
                assert_eq!(found, 9);
                assert_eq!(expected, DATABASE_VERSION);
            }
            other => panic!("expected version error, got {:?}", other.err()),
        }
    }

    #[test]
    fn insert_update_delete_cycle() {
        let (_dir, repo) = repo();
        let id = repo.insert(&customer("Nikos", "Georgiou", "Plumber", "", "")).unwrap();

        let mut stored = repo.get(id).unwrap().unwrap();
        assert_eq!(stored.id, Some(id));
        assert_eq!(stored.profession, "Plumber");

        stored.notes = "call after 5pm".into();
        repo.update(&stored).unwrap();
        assert_eq!(repo.get(id).unwrap().unwrap().notes, "call after 5pm");

        repo.delete(id).unwrap();
        assert!(repo.get(id).unwrap().is_none());
        assert!(matches!(repo.delete(id), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn invalid_writes_are_rejected() {
        let (_dir, repo) = repo();
        assert!(matches!(repo.insert(&Customer::new("")), Err(StoreError::EmptyFirstName)));
        assert!(matches!(repo.update(&Customer::new("Eleni")), Err(StoreError::MissingId)));

        let ghost = Customer { id: Some(404), ..Customer::new("Eleni") };
        assert!(matches!(repo.update(&ghost), Err(StoreError::NotFound(404))));
    }

    #[test]
    fn search_matches_prefixes_across_columns() {
        let (_dir, repo) = repo();
        repo.insert(&customer("maria", "Papadopoulou", "Architect", "Studio M", "6971112223")).unwrap();
        repo.insert(&customer("Anna", "Markou", "Doctor", "Clinic", "2310000000")).unwrap();
        repo.insert(&customer("Kostas", "Ioannou", "Architect", "Buildco", "6970000000")).unwrap();

        let names = |q: Option<&str>| -> Vec<String> {
            repo.search(q).unwrap().into_iter().map(|c| c.first_name).collect()
        };

        assert_eq!(names(None), vec!["Anna", "Kostas", "maria"]);
        assert_eq!(names(Some("")), vec!["Anna", "Kostas", "maria"]);
        assert_eq!(names(Some("mar")), vec!["Anna", "maria"]);
        assert_eq!(names(Some("architect 697")), vec!["Kostas", "maria"]);
        assert_eq!(names(Some("architect  studio")), vec!["maria"]);
        assert!(names(Some("tect")).is_empty());
    }
}
