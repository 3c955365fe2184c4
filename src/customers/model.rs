use crate::error::StoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Customer {
    /// Row id; `None` until the customer is saved.
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub profession: String,
    pub company_name: String,
    pub phone_number: String,
    pub notes: String,
}

/// Field-wise edit of a customer. `None` leaves the field as it is.
#[derive(Debug, Clone, Default)]
pub struct CustomerPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profession: Option<String>,
    pub company_name: Option<String>,
    pub phone_number: Option<String>,
    pub notes: Option<String>,
}

impl Customer {
    pub fn new(first_name: impl Into<String>) -> Self {
        Self { first_name: first_name.into(), ..Self::default() }
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.first_name.trim().is_empty() {
            return Err(StoreError::EmptyFirstName);
        }
        Ok(())
    }

    pub fn display_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    pub fn merge(&mut self, patch: CustomerPatch) {
        let CustomerPatch { first_name, last_name, profession, company_name, phone_number, notes } = patch;
        if let Some(v) = first_name { self.first_name = v; }
        if let Some(v) = last_name { self.last_name = v; }
        if let Some(v) = profession { self.profession = v; }
        if let Some(v) = company_name { self.company_name = v; }
        if let Some(v) = phone_number { self.phone_number = v; }
        if let Some(v) = notes { self.notes = v; }
    }
}

impl CustomerPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.profession.is_none()
            && self.company_name.is_none()
            && self.phone_number.is_none()
            && self.notes.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_first_name_is_rejected() {
        assert!(matches!(Customer::new("   ").validate(), Err(StoreError::EmptyFirstName)));
        assert!(Customer::new("Maria").validate().is_ok());
    }

    #[test]
    fn merge_only_touches_given_fields() {
        let mut c = Customer {
            last_name: "Papadopoulou".into(),
            notes: "prefers email".into(),
            ..Customer::new("Maria")
        };
        let patch = CustomerPatch { phone_number: Some("2101234567".into()), ..Default::default() };
        assert!(!patch.is_empty());
        c.merge(patch);

        assert_eq!(c.display_name(), "Maria Papadopoulou");
        assert_eq!(c.phone_number, "2101234567");
        assert_eq!(c.notes, "prefers email");
        assert!(CustomerPatch::default().is_empty());
    }
}
