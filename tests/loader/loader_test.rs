#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use schemascope::cache::MetadataCache;
    use schemascope::client::{ClientError, NOT_FOUND, TIMEOUT};
    use schemascope::loader::{DataLoader, FlightPolicy, LoadStatus, LoaderOptions};
    use schemascope::metadata::{
        ChoiceOption, Column, ColumnType, MetadataProvider, MetadataResult, Relationship,
        Requirement, Table,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::Semaphore;

    /// In-memory provider with scripted failures and call counters.
    #[derive(Default)]
    struct FakeProvider {
        tables: Vec<Table>,
        columns: HashMap<String, Vec<Column>>,
        /// Errors returned, in order, before falling back to the data.
        scripted_errors: Mutex<Vec<ClientError>>,
        calls: Mutex<HashMap<&'static str, usize>>,
        environment_failures: AtomicUsize,
        choice_gate: Option<Arc<Semaphore>>,
    }

    impl FakeProvider {
        fn record(&self, op: &'static str) {
            *self.calls.lock().unwrap().entry(op).or_default() += 1;
        }

        fn calls(&self, op: &'static str) -> usize {
            self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
        }

        fn next_error(&self) -> Option<ClientError> {
            let mut errors = self.scripted_errors.lock().unwrap();
            (!errors.is_empty()).then(|| errors.remove(0))
        }
    }

    #[async_trait]
    impl MetadataProvider for FakeProvider {
        async fn list_tables(&self) -> MetadataResult<Vec<Table>> {
            self.record("tables");
            match self.next_error() {
                Some(e) => Err(e),
                None => Ok(self.tables.clone()),
            }
        }

        async fn list_columns(&self, table: &str) -> MetadataResult<Vec<Column>> {
            self.record("columns");
            if let Some(e) = self.next_error() {
                return Err(e);
            }
            self.columns.get(table).cloned().ok_or(ClientError::NotFound)
        }

        async fn list_relationships(&self, _table: &str) -> MetadataResult<Vec<Relationship>> {
            self.record("relationships");
            Ok(vec![Relationship::one_to_many(
                "contact_customer_accounts",
                "contact",
                "parentcustomerid",
            )])
        }

        async fn choice_options(
            &self,
            _table: &str,
            _column: &str,
            column_type: Option<&ColumnType>,
        ) -> MetadataResult<Vec<ChoiceOption>> {
            self.record("choices");
            assert_eq!(column_type, Some(&ColumnType::Picklist));
            if let Some(gate) = &self.choice_gate {
                gate.acquire().await.unwrap().forget();
            }
            Ok(vec![
                ChoiceOption {
                    value: 1,
                    label: "Preferred".to_string(),
                },
                ChoiceOption {
                    value: 2,
                    label: "2".to_string(),
                },
            ])
        }

        async fn environment_id(&self) -> MetadataResult<String> {
            self.record("environment");
            if self.environment_failures.load(Ordering::SeqCst) > 0 {
                self.environment_failures.fetch_sub(1, Ordering::SeqCst);
                return Err(ClientError::Timeout);
            }
            Ok("00000000-0000-0000-0000-000000000001".to_string())
        }
    }

    fn table(logical_name: &str, display_name: &str, custom: bool) -> Table {
        Table {
            logical_name: logical_name.to_string(),
            display_name: display_name.to_string(),
            object_type_code: 0,
            is_custom_entity: custom,
            columns: Vec::new(),
            relationships: Vec::new(),
        }
    }

    fn contact_provider() -> FakeProvider {
        let columns = vec![
            Column::new("contactid", ColumnType::Uniqueidentifier, Requirement::System)
                .primary_key(),
            Column::new("preferredcontactmethodcode", ColumnType::Picklist, Requirement::Optional),
        ];
        FakeProvider {
            tables: vec![
                table("account", "Account", false),
                table("contact", "Contact", false),
                table("new_invoice", "Invoice", true),
            ],
            columns: [("contact".to_string(), columns)].into(),
            ..Default::default()
        }
    }

    fn loader(provider: FakeProvider) -> DataLoader<FakeProvider> {
        DataLoader::new(
            Arc::new(provider),
            Arc::new(MetadataCache::new()),
            LoaderOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_not_found_then_retry_succeeds() {
        let provider = contact_provider();
        provider
            .scripted_errors
            .lock()
            .unwrap()
            .push(ClientError::NotFound);
        let loader = loader(provider);

        assert_eq!(loader.column_status("contact"), LoadStatus::Idle);

        loader.load_columns("contact").await;
        assert_eq!(loader.column_status("contact"), LoadStatus::Error);
        assert_eq!(loader.column_error("contact").as_deref(), Some(NOT_FOUND));

        loader.load_columns("contact").await;
        assert_eq!(loader.column_status("contact"), LoadStatus::Success);
        assert_eq!(loader.column_error("contact"), None);
        assert_eq!(loader.cache().columns("contact").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_table_load_failure_and_retry() {
        let provider = contact_provider();
        provider
            .scripted_errors
            .lock()
            .unwrap()
            .push(ClientError::Timeout);
        let loader = loader(provider);

        loader.load_tables().await;
        assert_eq!(loader.table_status(), LoadStatus::Error);
        assert_eq!(loader.table_error().as_deref(), Some(TIMEOUT));
        assert!(loader.tables().await.is_empty());

        loader.retry_load_tables().await;
        assert_eq!(loader.table_status(), LoadStatus::Success);
        assert_eq!(loader.table_error(), None);
        assert_eq!(loader.tables().await.len(), 3);

        let custom = loader.custom_lookup().await;
        assert_eq!(custom.get("new_invoice"), Some(&true));
        assert_eq!(custom.get("account"), Some(&false));
    }

    #[tokio::test]
    async fn test_shared_cache_skips_network() {
        let cache = Arc::new(MetadataCache::new());
        let first = DataLoader::new(
            Arc::new(contact_provider()),
            Arc::clone(&cache),
            LoaderOptions::default(),
        );
        first.load_relationships("contact").await;

        let second_provider = Arc::new(contact_provider());
        let second = DataLoader::new(
            Arc::clone(&second_provider),
            Arc::clone(&cache),
            LoaderOptions {
                flight_policy: FlightPolicy::Unguarded,
            },
        );
        second.load_tables().await;
        second.load_relationships("contact").await;

        assert_eq!(second.relationship_status("contact"), LoadStatus::Success);
        assert_eq!(
            second.table("contact").await.unwrap().relationships.len(),
            1
        );
        assert_eq!(second_provider.calls("relationships"), 0);
        assert_eq!(cache.stats().relationship_tables, 1);
    }

    #[tokio::test]
    async fn test_choice_options_collapse_concurrent_requests() {
        let gate = Arc::new(Semaphore::new(0));
        let provider = FakeProvider {
            choice_gate: Some(Arc::clone(&gate)),
            ..contact_provider()
        };
        let loader = loader(provider);
        loader.load_tables().await;
        loader.load_columns("contact").await;

        tokio::join!(
            loader.load_choice_options("contact", "preferredcontactmethodcode", None),
            loader.load_choice_options("contact", "preferredcontactmethodcode", None),
            async {
                assert_eq!(
                    loader.choice_status("contact", "preferredcontactmethodcode"),
                    LoadStatus::Loading
                );
                gate.add_permits(1);
            }
        );

        assert_eq!(
            loader.choice_status("contact", "preferredcontactmethodcode"),
            LoadStatus::Success
        );

        let contact = loader.table("contact").await.unwrap();
        let column = contact.column("preferredcontactmethodcode").unwrap();
        assert_eq!(column.option_count, Some(2));
        assert_eq!(column.options.as_ref().unwrap()[1].label, "2");
    }

    #[tokio::test]
    async fn test_choice_options_before_columns() {
        let loader = loader(contact_provider());
        loader.load_tables().await;

        loader
            .load_choice_options(
                "contact",
                "preferredcontactmethodcode",
                Some(&ColumnType::Picklist),
            )
            .await;
        loader.load_columns("contact").await;

        assert_eq!(
            loader.choice_status("contact", "preferredcontactmethodcode"),
            LoadStatus::Success
        );
        let contact = loader.table("contact").await.unwrap();
        let column = contact.column("preferredcontactmethodcode").unwrap();
        assert_eq!(column.option_count, Some(2));
        assert_eq!(column.options.as_ref().unwrap()[0].label, "Preferred");

        // A second load is served from cache and keeps the options.
        loader.load_columns("contact").await;
        let contact = loader.table("contact").await.unwrap();
        let column = contact.column("preferredcontactmethodcode").unwrap();
        assert_eq!(column.option_count, Some(2));
    }

    #[tokio::test]
    async fn test_environment_failure_is_not_remembered() {
        let provider = contact_provider();
        provider.environment_failures.store(1, Ordering::SeqCst);
        let loader = loader(provider);

        assert_eq!(loader.environment_id().await, Err(TIMEOUT.to_string()));
        let id = loader.environment_id().await.unwrap();
        assert_eq!(id, "00000000-0000-0000-0000-000000000001");
        assert_eq!(loader.environment_id().await.unwrap(), id);
    }

    #[tokio::test]
    async fn test_failures_are_per_key() {
        let loader = loader(contact_provider());

        loader.load_columns("missing_table").await;
        loader.load_columns("contact").await;

        assert_eq!(loader.column_status("missing_table"), LoadStatus::Error);
        assert_eq!(loader.column_status("contact"), LoadStatus::Success);
        assert_eq!(loader.column_status("account"), LoadStatus::Idle);
    }
}
