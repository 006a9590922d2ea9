//! Contract tests for `ShopStore` backends.

/// Generate the store contract suite for a backend.
///
/// `$factory` must produce an empty `impl ShopStore + 'static`.
#[macro_export]
macro_rules! shop_store_tests {
    ($factory:expr) => {
        mod shop_store_tests {
            use super::*;
            use shopfront::prelude::*;
            use std::sync::Arc;

            async fn make_store() -> Arc<dyn ShopStore> {
                Arc::new($factory)
            }

            fn add(product: i64, quantity: i32) -> AddProduct {
                AddProduct { product, quantity }
            }

            // ==============================================================
            // Customers, products, categories
            // ==============================================================

            #[tokio::test]
            async fn test_customer_crud() {
                let store = make_store().await;
                let id = shop_harness::seed_customer(&*store, "Ada").await;

                let customer = store.get_customer(id).await.unwrap();
                assert_eq!(customer.first_name, "Ada");

                store
                    .update_customer(
                        id,
                        CustomerInput {
                            first_name: "Grace".to_string(),
                            last_name: "Hopper".to_string(),
                        },
                    )
                    .await
                    .unwrap();
                assert_eq!(store.get_customer(id).await.unwrap().last_name, "Hopper");

                store.delete_customer(id).await.unwrap();
                assert!(matches!(
                    store.get_customer(id).await,
                    Err(ShopError::NotFound { .. })
                ));
            }

            #[tokio::test]
            async fn test_update_missing_rows_is_not_found() {
                let store = make_store().await;
                let product = ProductInput {
                    name: "Ghost".to_string(),
                    quantity: 1,
                };
                assert!(matches!(
                    store.update_product(4242, product).await,
                    Err(ShopError::NotFound { .. })
                ));
                assert!(matches!(
                    store.delete_category(4242).await,
                    Err(ShopError::NotFound { .. })
                ));
                assert!(matches!(
                    store.customer_orders(4242).await,
                    Err(ShopError::NotFound { .. })
                ));
            }

            #[tokio::test]
            async fn test_list_is_ordered_by_id() {
                let store = make_store().await;
                let first = shop_harness::seed_product(&*store, "Rake", 3).await;
                let second = shop_harness::seed_product(&*store, "Hoe", 4).await;

                let ids: Vec<i64> = store
                    .list_products()
                    .await
                    .unwrap()
                    .iter()
                    .map(|p| p.id)
                    .collect();
                assert_eq!(ids, vec![first, second]);
            }

            #[tokio::test]
            async fn test_product_category_links() {
                let store = make_store().await;
                let product = shop_harness::seed_product(&*store, "Shovel", 10).await;
                let garden = shop_harness::seed_category(&*store, "Garden").await;
                let tools = shop_harness::seed_category(&*store, "Tools").await;

                store.add_product_category(product, garden).await.unwrap();
                store.add_product_category(product, tools).await.unwrap();

                let names: Vec<String> = store
                    .product_categories(product)
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|c| c.name)
                    .collect();
                assert_eq!(names, vec!["Garden".to_string(), "Tools".to_string()]);

                let in_garden = store.category_products(garden).await.unwrap();
                assert_eq!(in_garden.len(), 1);
                assert_eq!(in_garden[0].id, product);

                assert!(matches!(
                    store.add_product_category(product, garden).await,
                    Err(ShopError::ConstraintViolation { .. })
                ));
                assert!(matches!(
                    store.add_product_category(product, 9999).await,
                    Err(ShopError::ConstraintViolation { .. })
                ));

                store.remove_product_category(product, garden).await.unwrap();
                assert!(matches!(
                    store.remove_product_category(product, garden).await,
                    Err(ShopError::NotFound { .. })
                ));
            }

            #[tokio::test]
            async fn test_delete_category_removes_links() {
                let store = make_store().await;
                let product = shop_harness::seed_product(&*store, "Shovel", 10).await;
                let garden = shop_harness::seed_category(&*store, "Garden").await;
                store.add_product_category(product, garden).await.unwrap();

                store.delete_category(garden).await.unwrap();

                assert!(store.product_categories(product).await.unwrap().is_empty());
                assert!(store.get_product(product).await.is_ok());
            }

            #[tokio::test]
            async fn test_delete_referenced_product_is_rejected() {
                let store = make_store().await;
                let customer = shop_harness::seed_customer(&*store, "Ada").await;
                let product = shop_harness::seed_product(&*store, "Shovel", 10).await;
                store
                    .create_order(shop_harness::new_order(customer, &[(product, 1)]))
                    .await
                    .unwrap();

                assert!(matches!(
                    store.delete_product(product).await,
                    Err(ShopError::ConstraintViolation { .. })
                ));
                assert!(matches!(
                    store.delete_customer(customer).await,
                    Err(ShopError::ConstraintViolation { .. })
                ));
            }

            // ==============================================================
            // Orders
            // ==============================================================

            #[tokio::test]
            async fn test_order_round_trip() {
                let store = make_store().await;
                let customer = shop_harness::seed_customer(&*store, "Ada").await;
                let product = shop_harness::seed_product(&*store, "Shovel", 10).await;

                let order_id = store
                    .create_order(shop_harness::new_order(customer, &[(product, 3)]))
                    .await
                    .unwrap();

                let orders = store.customer_orders(customer).await.unwrap();
                assert_eq!(orders.len(), 1);
                assert_eq!(orders[0].id, order_id);
                assert_eq!(orders[0].status, "new");

                let lines = store.order_line_items(order_id).await.unwrap();
                assert_eq!(
                    lines,
                    vec![LineItem {
                        product_id: product,
                        quantity: 3
                    }]
                );

                let detail = store.get_order(order_id).await.unwrap();
                assert_eq!(detail.order.customer_id, customer);
                assert_eq!(detail.products, lines);
            }

            #[tokio::test]
            async fn test_empty_order_has_no_lines() {
                let store = make_store().await;
                let customer = shop_harness::seed_customer(&*store, "Ada").await;

                let order_id = store
                    .create_order(shop_harness::new_order(customer, &[]))
                    .await
                    .unwrap();

                assert!(store.order_line_items(order_id).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_failing_line_item_rolls_back_order() {
                let store = make_store().await;
                let customer = shop_harness::seed_customer(&*store, "Ada").await;
                let product = shop_harness::seed_product(&*store, "Shovel", 10).await;

                let result = store
                    .create_order(shop_harness::new_order(
                        customer,
                        &[(product, 1), (987_654, 1)],
                    ))
                    .await;

                assert!(matches!(result, Err(ShopError::ConstraintViolation { .. })));
                assert!(store.list_orders().await.unwrap().is_empty());
                assert!(store.customer_orders(customer).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_order_for_unknown_customer_is_rejected() {
                let store = make_store().await;
                let result = store
                    .create_order(shop_harness::new_order(123_456, &[]))
                    .await;
                assert!(matches!(result, Err(ShopError::ConstraintViolation { .. })));
            }

            #[tokio::test]
            async fn test_update_order_header() {
                let store = make_store().await;
                let customer = shop_harness::seed_customer(&*store, "Ada").await;
                let order_id = store
                    .create_order(shop_harness::new_order(customer, &[]))
                    .await
                    .unwrap();

                store
                    .update_order(
                        order_id,
                        OrderUpdate {
                            status: "placed".to_string(),
                            place_date: Some(shop_harness::march(4)),
                        },
                    )
                    .await
                    .unwrap();

                let detail = store.get_order(order_id).await.unwrap();
                assert_eq!(detail.order.status, "placed");
                assert_eq!(detail.order.place_date, Some(shop_harness::march(4)));
            }

            #[tokio::test]
            async fn test_delete_order_removes_lines() {
                let store = make_store().await;
                let customer = shop_harness::seed_customer(&*store, "Ada").await;
                let product = shop_harness::seed_product(&*store, "Shovel", 10).await;
                let order_id = store
                    .create_order(shop_harness::new_order(customer, &[(product, 3)]))
                    .await
                    .unwrap();

                store.delete_order(order_id).await.unwrap();

                assert!(matches!(
                    store.order_line_items(order_id).await,
                    Err(ShopError::NotFound { .. })
                ));
                // The product is no longer referenced and can go
                store.delete_product(product).await.unwrap();
            }

            #[tokio::test]
            async fn test_add_product_merges_quantities() {
                let store = make_store().await;
                let customer = shop_harness::seed_customer(&*store, "Ada").await;
                let product = shop_harness::seed_product(&*store, "Shovel", 10).await;
                let order_id = store
                    .create_order(shop_harness::new_order(customer, &[(product, 3)]))
                    .await
                    .unwrap();

                let quantity = store
                    .add_order_product(order_id, add(product, 2), LineItemMode::Merge)
                    .await
                    .unwrap();

                assert_eq!(quantity, 5);
                let lines = store.order_line_items(order_id).await.unwrap();
                assert_eq!(
                    lines,
                    vec![LineItem {
                        product_id: product,
                        quantity: 5
                    }]
                );
            }

            #[tokio::test]
            async fn test_add_new_product_inserts_line() {
                let store = make_store().await;
                let customer = shop_harness::seed_customer(&*store, "Ada").await;
                let shovel = shop_harness::seed_product(&*store, "Shovel", 10).await;
                let rake = shop_harness::seed_product(&*store, "Rake", 10).await;
                let order_id = store
                    .create_order(shop_harness::new_order(customer, &[(shovel, 3)]))
                    .await
                    .unwrap();

                store
                    .add_order_product(order_id, add(rake, 4), LineItemMode::Merge)
                    .await
                    .unwrap();

                let lines = store.order_line_items(order_id).await.unwrap();
                assert_eq!(lines.len(), 2);
                assert_eq!(lines[1].product_id, rake);
                assert_eq!(lines[1].quantity, 4);
            }

            #[tokio::test]
            async fn test_legacy_append_keeps_old_row() {
                let store = make_store().await;
                let customer = shop_harness::seed_customer(&*store, "Ada").await;
                let product = shop_harness::seed_product(&*store, "Shovel", 10).await;
                let order_id = store
                    .create_order(shop_harness::new_order(customer, &[(product, 3)]))
                    .await
                    .unwrap();

                store
                    .add_order_product(order_id, add(product, 2), LineItemMode::LegacyAppend)
                    .await
                    .unwrap();

                let quantities: Vec<i32> = store
                    .order_line_items(order_id)
                    .await
                    .unwrap()
                    .iter()
                    .map(|line| line.quantity)
                    .collect();
                assert_eq!(quantities, vec![3, 5]);

                assert!(matches!(
                    store.update_order_product(order_id, product, 1).await,
                    Err(ShopError::MultipleRows { count: 2, .. })
                ));

                // Removal clears every duplicate
                store.remove_order_product(order_id, product).await.unwrap();
                assert!(store.order_line_items(order_id).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_merge_over_duplicates_updates_first_row() {
                let store = make_store().await;
                let customer = shop_harness::seed_customer(&*store, "Ada").await;
                let product = shop_harness::seed_product(&*store, "Shovel", 10).await;
                let order_id = store
                    .create_order(shop_harness::new_order(customer, &[(product, 3)]))
                    .await
                    .unwrap();
                store
                    .add_order_product(order_id, add(product, 2), LineItemMode::LegacyAppend)
                    .await
                    .unwrap();

                let merged = store
                    .add_order_product(order_id, add(product, 1), LineItemMode::Merge)
                    .await
                    .unwrap();
                assert_eq!(merged, 4);

                let quantities: Vec<i32> = store
                    .order_line_items(order_id)
                    .await
                    .unwrap()
                    .iter()
                    .map(|line| line.quantity)
                    .collect();
                assert_eq!(quantities, vec![4, 5]);
            }

            #[tokio::test]
            async fn test_add_product_to_missing_order_is_not_found() {
                let store = make_store().await;
                let product = shop_harness::seed_product(&*store, "Shovel", 10).await;

                assert!(matches!(
                    store
                        .add_order_product(55_555, add(product, 1), LineItemMode::Merge)
                        .await,
                    Err(ShopError::NotFound { .. })
                ));
            }

            #[tokio::test]
            async fn test_concurrent_adds_are_serialized() {
                let store = make_store().await;
                let customer = shop_harness::seed_customer(&*store, "Ada").await;
                let product = shop_harness::seed_product(&*store, "Shovel", 10).await;
                let order_id = store
                    .create_order(shop_harness::new_order(customer, &[(product, 0)]))
                    .await
                    .unwrap();

                let handles: Vec<_> = (0..8)
                    .map(|_| {
                        let store = store.clone();
                        tokio::spawn(async move {
                            store
                                .add_order_product(order_id, add(product, 1), LineItemMode::Merge)
                                .await
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.await.unwrap().unwrap();
                }

                let lines = store.order_line_items(order_id).await.unwrap();
                assert_eq!(lines.len(), 1);
                assert_eq!(lines[0].quantity, 8);
            }

            #[tokio::test]
            async fn test_update_and_remove_order_product() {
                let store = make_store().await;
                let customer = shop_harness::seed_customer(&*store, "Ada").await;
                let product = shop_harness::seed_product(&*store, "Shovel", 10).await;
                let order_id = store
                    .create_order(shop_harness::new_order(customer, &[(product, 3)]))
                    .await
                    .unwrap();

                store
                    .update_order_product(order_id, product, 9)
                    .await
                    .unwrap();
                assert_eq!(store.order_line_items(order_id).await.unwrap()[0].quantity, 9);

                store.remove_order_product(order_id, product).await.unwrap();
                assert!(matches!(
                    store.update_order_product(order_id, product, 1).await,
                    Err(ShopError::NotFound { .. })
                ));
                assert!(matches!(
                    store.remove_order_product(order_id, product).await,
                    Err(ShopError::NotFound { .. })
                ));
            }

            // ==============================================================
            // Reports
            // ==============================================================

            #[tokio::test]
            async fn test_category_purchases_attribute_full_quantity() {
                let store = make_store().await;
                let ada = shop_harness::seed_customer(&*store, "Ada").await;
                let bob = shop_harness::seed_customer(&*store, "Bob").await;
                let shovel = shop_harness::seed_product(&*store, "Shovel", 10).await;
                let lamp = shop_harness::seed_product(&*store, "Lamp", 10).await;
                let garden = shop_harness::seed_category(&*store, "Garden").await;
                let tools = shop_harness::seed_category(&*store, "Tools").await;
                store.add_product_category(shovel, garden).await.unwrap();
                store.add_product_category(shovel, tools).await.unwrap();

                store
                    .create_order(shop_harness::new_order(ada, &[(shovel, 4)]))
                    .await
                    .unwrap();
                store
                    .create_order(shop_harness::new_order(ada, &[(shovel, 1), (lamp, 7)]))
                    .await
                    .unwrap();
                // Bob only bought an uncategorized product
                store
                    .create_order(shop_harness::new_order(bob, &[(lamp, 2)]))
                    .await
                    .unwrap();

                let rows = store.category_purchases().await.unwrap();
                assert_eq!(
                    rows,
                    vec![
                        CategoryPurchase {
                            customer_id: ada,
                            customer_first_name: "Ada".to_string(),
                            category_id: garden,
                            category_name: "Garden".to_string(),
                            number_purchased: 5,
                        },
                        CategoryPurchase {
                            customer_id: ada,
                            customer_first_name: "Ada".to_string(),
                            category_id: tools,
                            category_name: "Tools".to_string(),
                            number_purchased: 5,
                        },
                    ]
                );
            }

            #[tokio::test]
            async fn test_units_sold_window() {
                let store = make_store().await;
                let customer = shop_harness::seed_customer(&*store, "Ada").await;
                let product = shop_harness::seed_product(&*store, "Shovel", 10).await;

                for (day, quantity) in [(Some(2), 4), (Some(9), 6), (None, 100)] {
                    let mut order = shop_harness::new_order(customer, &[(product, quantity)]);
                    order.place_date = day.map(shop_harness::march);
                    store.create_order(order).await.unwrap();
                }

                let march = shop_harness::march;
                assert_eq!(store.units_sold(march(1), march(5)).await.unwrap(), 4);
                assert_eq!(store.units_sold(march(1), march(9)).await.unwrap(), 10);
                assert_eq!(store.units_sold(march(2), march(2)).await.unwrap(), 4);
                assert_eq!(store.units_sold(march(20), march(25)).await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_units_sold_plain_date_end_covers_whole_day() {
                let store = make_store().await;
                let customer = shop_harness::seed_customer(&*store, "Ada").await;
                let product = shop_harness::seed_product(&*store, "Shovel", 10).await;

                for (day, quantity) in [(2, 4), (9, 6)] {
                    let mut order = shop_harness::new_order(customer, &[(product, quantity)]);
                    order.place_date = Some(shop_harness::march(day));
                    store.create_order(order).await.unwrap();
                }

                let single = shop_harness::date_window("2024-03-02", "2024-03-02");
                let sold = store.units_sold(single.start(), single.end()).await.unwrap();
                assert_eq!(single.days(), 1);
                assert_eq!(sold, 4);

                let week = shop_harness::date_window("2024-03-02", "2024-03-09");
                let sold = store.units_sold(week.start(), week.end()).await.unwrap();
                assert_eq!(week.days(), 8);
                assert_eq!(sold, 10);

                let before = shop_harness::date_window("2024-03-01", "2024-03-01");
                let sold = store.units_sold(before.start(), before.end()).await.unwrap();
                assert_eq!(sold, 0);
            }
        }
    };
}
