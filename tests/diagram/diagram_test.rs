#[cfg(test)]
mod tests {
    use schemascope::diagram::{
        build_er_diagram, parse_er_diagram, Cardinality, DiagramInput, ErDiagramBuilder,
        SystemColumnDenyList,
    };
    use schemascope::metadata::{Column, ColumnType, Relationship, Requirement};
    use std::collections::HashMap;

    fn account_columns() -> Vec<Column> {
        vec![
            Column::new("accountid", ColumnType::Uniqueidentifier, Requirement::System)
                .primary_key(),
            Column::new("name", ColumnType::String, Requirement::Required),
            Column::new("ownerid", ColumnType::Lookup, Requirement::System),
        ]
    }

    #[test]
    fn test_system_lookup_omitted_custom_child_kept() {
        let columns = account_columns();
        let relationships = vec![Relationship::one_to_many(
            "new_account_invoice",
            "new_invoice",
            "accountid",
        )];
        let custom: HashMap<String, bool> = [
            ("account".to_string(), false),
            ("new_invoice".to_string(), true),
        ]
        .into();

        let diagram = build_er_diagram(DiagramInput {
            table_logical_name: "account",
            columns: &columns,
            relationships: &relationships,
            custom_lookup: Some(&custom),
        });

        assert_eq!(diagram.omitted_column_count, 1);
        assert_eq!(diagram.omitted_relationship_count, 0);
        assert_eq!(diagram.relationship_count, 1);
        assert!(!diagram.code.contains("ownerid"));
        assert_eq!(
            diagram.code,
            [
                "erDiagram",
                "  account {",
                "    guid accountid PK",
                "    string name",
                "  }",
                "  new_invoice {",
                "    lookup accountid",
                "  }",
                "  account ||--o{ new_invoice : \"new_account_invoice (accountid -> accountid)\"",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_many_to_many_kept_through_custom_junction() {
        let relationships = vec![Relationship::many_to_many(
            "new_account_contact",
            "contact",
            "new_junction",
        )];
        let custom: HashMap<String, bool> = [
            ("contact".to_string(), false),
            ("new_junction".to_string(), true),
        ]
        .into();

        let diagram = build_er_diagram(DiagramInput {
            table_logical_name: "account",
            columns: &account_columns(),
            relationships: &relationships,
            custom_lookup: Some(&custom),
        });

        assert_eq!(diagram.relationship_count, 1);
        assert!(diagram
            .code
            .ends_with("account }o--o{ contact : \"new_account_contact (via new_junction)\""));
    }

    #[test]
    fn test_deny_listed_relationships_counted() {
        let columns = vec![
            Column::new("accountid", ColumnType::Uniqueidentifier, Requirement::System)
                .primary_key(),
            Column::new("createdby", ColumnType::Lookup, Requirement::Optional),
            Column::new("modifiedby", ColumnType::Lookup, Requirement::Optional),
            Column::new("parentaccountid", ColumnType::Lookup, Requirement::Optional),
        ];
        let relationships = vec![
            Relationship::many_to_one("lk_accountbase_createdby", "systemuser", "createdby")
                .with_referenced("systemuserid"),
            Relationship::many_to_one("lk_accountbase_modifiedby", "systemuser", "modifiedby")
                .with_referenced("systemuserid"),
            Relationship::many_to_one("account_parent_account", "account", "parentaccountid")
                .with_referenced("accountid"),
        ];

        let diagram = build_er_diagram(DiagramInput {
            table_logical_name: "account",
            columns: &columns,
            relationships: &relationships,
            custom_lookup: None,
        });

        assert_eq!(diagram.omitted_column_count, 2);
        assert_eq!(diagram.omitted_relationship_count, 2);
        assert_eq!(diagram.relationship_count, 1);
        assert_eq!(
            diagram.summary(),
            "Omits 2 system relationships and 2 system columns"
        );
    }

    #[test]
    fn test_replacement_deny_list() {
        let deny_list = SystemColumnDenyList::from_toml(
            r#"
version = 1
columns = ["new_legacyid"]
"#,
        )
        .unwrap();
        let columns = vec![
            Column::new("new_orderid", ColumnType::Uniqueidentifier, Requirement::System)
                .primary_key(),
            Column::new("new_legacyid", ColumnType::String, Requirement::Optional),
            Column::new("ownerid", ColumnType::Owner, Requirement::Optional),
        ];

        let diagram = ErDiagramBuilder::new(deny_list).build(DiagramInput {
            table_logical_name: "new_order",
            columns: &columns,
            relationships: &[],
            custom_lookup: None,
        });

        assert_eq!(diagram.omitted_column_count, 1);
        assert!(diagram.code.contains("lookup ownerid"));
        assert!(!diagram.code.contains("new_legacyid"));
    }

    #[test]
    fn test_round_trip_through_parser() {
        let columns = vec![
            Column::new("new_projectid", ColumnType::Uniqueidentifier, Requirement::System)
                .primary_key(),
            Column::new("new_name", ColumnType::String, Requirement::Required),
            Column::new("new_budget", ColumnType::Money, Requirement::Optional),
            Column::new("new_accountid", ColumnType::Lookup, Requirement::Optional),
        ];
        let relationships = vec![
            Relationship::many_to_one("new_project_account", "account", "new_accountid")
                .with_referenced("accountid"),
            Relationship::one_to_many("new_project_task", "new_task", "new_projectid"),
            Relationship::many_to_many("new_project_tag", "new_tag", "new_project_tag"),
        ];
        let custom: HashMap<String, bool> = [
            ("account".to_string(), false),
            ("new_task".to_string(), true),
            ("new_tag".to_string(), true),
        ]
        .into();

        let diagram = build_er_diagram(DiagramInput {
            table_logical_name: "new_project",
            columns: &columns,
            relationships: &relationships,
            custom_lookup: Some(&custom),
        });
        let parsed = parse_er_diagram(&diagram.code).unwrap();

        assert_eq!(parsed.relationships.len(), diagram.relationship_count);
        assert_eq!(parsed.entities.len(), 4);

        let focal = parsed.entity("new_project").unwrap();
        assert_eq!(focal.attributes.len(), 4);
        assert!(focal.attributes[0].primary_key);
        assert_eq!(focal.attributes[2].type_name, "float");

        let account = parsed.entity("account").unwrap();
        assert_eq!(account.attributes[0].name, "accountid");
        assert!(account.attributes[0].primary_key);

        let cardinalities: Vec<Cardinality> =
            parsed.relationships.iter().map(|r| r.cardinality).collect();
        assert_eq!(
            cardinalities,
            vec![
                Cardinality::ManyToOne,
                Cardinality::OneToMany,
                Cardinality::ManyToMany
            ]
        );
        assert_eq!(
            parsed.relationships[1].label,
            "new_project_task (new_projectid -> new_projectid)"
        );
    }
}
