#[cfg(test)]
mod tests {
    use schemascope::metadata::{Column, ColumnType, Requirement, Table};
    use schemascope::search::{filter_columns, filter_tables, matches_search, normalize_search_text};

    fn table(logical_name: &str, display_name: &str) -> Table {
        Table {
            logical_name: logical_name.to_string(),
            display_name: display_name.to_string(),
            object_type_code: 0,
            is_custom_entity: false,
            columns: Vec::new(),
            relationships: Vec::new(),
        }
    }

    fn sample_tables() -> Vec<Table> {
        vec![
            table("account", "Account"),
            table("contact", "Contact"),
            table("new_projecttask", "Project Task"),
            table("msdyn_workorder", "Work Order"),
        ]
    }

    #[test]
    fn test_acc_matches_account_only() {
        let tables = vec![table("account", "Account"), table("contact", "Contact")];
        let names: Vec<&str> = filter_tables(&tables, "Acc")
            .iter()
            .map(|t| t.logical_name.as_str())
            .collect();
        assert_eq!(names, vec!["account"]);
    }

    #[test]
    fn test_multi_token_query_requires_all_tokens() {
        let tables = sample_tables();
        let names: Vec<&str> = filter_tables(&tables, "work ord")
            .iter()
            .map(|t| t.logical_name.as_str())
            .collect();
        assert_eq!(names, vec!["msdyn_workorder"]);

        assert!(filter_tables(&tables, "work account").is_empty());
    }

    #[test]
    fn test_camel_case_query_splits() {
        let tables = sample_tables();
        let names: Vec<&str> = filter_tables(&tables, "ProjectTask")
            .iter()
            .map(|t| t.logical_name.as_str())
            .collect();
        assert_eq!(names, vec!["new_projecttask"]);
    }

    #[test]
    fn test_order_is_preserved() {
        let tables = sample_tables();
        let names: Vec<&str> = filter_tables(&tables, "o")
            .iter()
            .map(|t| t.logical_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["account", "contact", "new_projecttask", "msdyn_workorder"]
        );
    }

    #[test]
    fn test_symbol_only_query_returns_everything() {
        let tables = sample_tables();
        assert_eq!(filter_tables(&tables, "  ** ").len(), tables.len());
    }

    #[test]
    fn test_normalize_and_match() {
        assert_eq!(
            normalize_search_text("msdyn_WorkOrder-Type.v2"),
            vec!["msdyn", "work", "order", "type", "v2"]
        );
        let tokens = normalize_search_text("order type");
        assert!(matches_search("msdyn_WorkOrder-Type.v2", &tokens));
    }

    #[test]
    fn test_filter_columns_on_display_name() {
        let columns = vec![
            Column::new("emailaddress1", ColumnType::String, Requirement::Optional)
                .with_display_name("Email"),
            Column::new("telephone1", ColumnType::String, Requirement::Optional)
                .with_display_name("Business Phone"),
        ];
        let names: Vec<&str> = filter_columns(&columns, "phone")
            .iter()
            .map(|c| c.logical_name.as_str())
            .collect();
        assert_eq!(names, vec!["telephone1"]);
    }
}
