use validator::{ValidationError, ValidationErrors};

type Check<R> = Box<dyn Fn(&R) -> Result<(), ValidationError> + Send + Sync>;

/// Ordered list of field rules for one request type.
///
/// Every rule runs, in registration order, so a client sees all problems
/// with a request at once. Any failure keeps the request away from its
/// handler.
///
/// ```ignore
/// let rules = Validator::<CreateCategory>::new()
///     .rule("name", |r| rules::not_blank(&r.name))
///     .rule("name", |r| rules::max_chars(&r.name, 100));
/// ```
pub struct Validator<R> {
    rules: Vec<(&'static str, Check<R>)>,
}

impl<R> Validator<R> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule reporting its failure under `field`.
    pub fn rule<F>(mut self, field: &'static str, check: F) -> Self
    where
        F: Fn(&R) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.rules.push((field, Box::new(check)));
        self
    }

    pub fn validate(&self, request: &R) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for (field, check) in &self.rules {
            if let Err(error) = check(request) {
                errors.add(*field, error);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl<R> Default for Validator<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules;

    struct Paging {
        page: i64,
        size: i64,
    }

    fn paging_rules() -> Validator<Paging> {
        Validator::new()
            .rule("page", |p: &Paging| rules::at_least(p.page, 1))
            .rule("size", |p: &Paging| rules::between(p.size, 1, 25))
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(paging_rules().validate(&Paging { page: 1, size: 25 }).is_ok());
    }

    #[test]
    fn test_all_failures_are_collected() {
        let errors = paging_rules()
            .validate(&Paging { page: 0, size: 26 })
            .unwrap_err();

        let fields = errors.field_errors();
        assert!(fields.contains_key("page"));
        assert!(fields.contains_key("size"));
    }

    #[test]
    fn test_multiple_rules_on_one_field_keep_order() {
        let validator = Validator::<String>::new()
            .rule("name", |s| rules::not_blank(s))
            .rule("name", |s| rules::max_chars(s, 3));

        let errors = validator.validate(&"     ".to_string()).unwrap_err();
        let fields = errors.field_errors();
        let name_errors = fields["name"];
        assert_eq!(name_errors.len(), 2);
        assert_eq!(name_errors[0].code, "required");
        assert_eq!(name_errors[1].code, "length");
    }
}
