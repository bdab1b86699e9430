use havenz_domain::pagination::PageRequest;
use havenz_domain::role::RoleCode;
use havenz_domain::status::WorkOrderStatus;

use havenz_dashboard::domain::types::Insurance;
use havenz_dashboard::error::DashboardError;
use havenz_dashboard::usecase::workorder::{
    CODE_SUFFIX_LEN, CreateWorkOrderInput, CreateWorkOrderUseCase, GetWorkOrderUseCase,
    ListWorkOrdersUseCase,
};

use crate::helpers::{
    MockShopRepo, MockWorkOrderRepo, actor, damage_date, seed_order, test_customer, test_shop,
    test_vehicle,
};

fn intake(shop_code: Option<&str>) -> CreateWorkOrderInput {
    CreateWorkOrderInput {
        shop_code: shop_code.map(Into::into),
        damage_date: Some(damage_date()),
        customer: test_customer(),
        vehicle: test_vehicle(),
        insurance: Some(Insurance {
            insurance_company: Some(" Prairie Mutual ".into()),
            agent_first_name: Some("Dana".into()),
            agent_last_name: Some("Wu".into()),
            agent_phone: Some("780-555-0110".into()),
            policy_number: Some("PM-2231".into()),
            claim_number: Some("  ".into()),
        }),
    }
}

// ── CreateWorkOrder ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_order_in_actors_shop() {
    let s1 = test_shop("S1");
    let orders = MockWorkOrderRepo::new(&[s1.clone()]);
    let create = CreateWorkOrderUseCase {
        shops: MockShopRepo::new(vec![s1.clone()]),
        work_orders: orders.clone(),
    };

    let detail = create
        .execute(&actor(RoleCode::Adjuster, Some(&s1)), intake(None))
        .await
        .unwrap();

    assert_eq!(detail.shop.id, s1.id);
    assert_eq!(detail.status, WorkOrderStatus::WaitingForInspection);
    assert!(detail.code.starts_with("WO-"));
    assert_eq!(detail.code.len(), 3 + CODE_SUFFIX_LEN);
    assert_eq!(detail.damage_date, Some(damage_date()));

    assert_eq!(detail.customer.first_name, "Jane");
    assert_eq!(detail.customer.email, "jane.doe@example.com");
    assert_eq!(detail.customer.postal_code, "T5J0N3");
    assert_eq!(detail.customer.province, "AB");
    assert_eq!(detail.vehicle.plate_no, "BXR 442");
    assert_eq!(detail.vehicle.vin.as_deref(), Some("2T1BU4EE9DC123456"));

    let insurance = detail.insurance.unwrap();
    assert_eq!(insurance.insurance_company.as_deref(), Some("Prairie Mutual"));
    assert_eq!(insurance.claim_number, None);
    assert_eq!(insurance.agent_full_name().as_deref(), Some("Dana Wu"));
}

#[tokio::test]
async fn should_reject_staff_naming_another_shop() {
    let (s1, s2) = (test_shop("S1"), test_shop("S2"));
    let orders = MockWorkOrderRepo::new(&[s1.clone(), s2.clone()]);
    let err = CreateWorkOrderUseCase {
        shops: MockShopRepo::new(vec![s1.clone(), s2]),
        work_orders: orders.clone(),
    }
    .execute(&actor(RoleCode::Adjuster, Some(&s1)), intake(Some("S2")))
    .await
    .unwrap_err();

    assert_eq!(err.field(), Some("shopCode"));
    assert!(orders.orders.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_require_superadmin_to_name_the_shop() {
    let s1 = test_shop("S1");
    let create = CreateWorkOrderUseCase {
        shops: MockShopRepo::new(vec![s1.clone()]),
        work_orders: MockWorkOrderRepo::new(&[s1.clone()]),
    };
    let root = actor(RoleCode::SuperAdmin, None);

    let err = create.execute(&root, intake(None)).await.unwrap_err();
    assert_eq!(err.field(), Some("shopCode"));

    let detail = create.execute(&root, intake(Some("s1"))).await.unwrap();
    assert_eq!(detail.shop.id, s1.id);

    let err = create.execute(&root, intake(Some("NOPE"))).await.unwrap_err();
    assert_eq!(err.field(), Some("shopCode"));
}

#[tokio::test]
async fn should_refuse_shopless_staff() {
    let s1 = test_shop("S1");
    let err = CreateWorkOrderUseCase {
        shops: MockShopRepo::new(vec![s1.clone()]),
        work_orders: MockWorkOrderRepo::new(&[s1]),
    }
    .execute(&actor(RoleCode::Adjuster, None), intake(None))
    .await
    .unwrap_err();
    assert!(matches!(err, DashboardError::NoShopAssignment), "got {err:?}");
}

#[tokio::test]
async fn should_retry_with_fresh_code_on_collision() {
    let s1 = test_shop("S1");
    let orders = MockWorkOrderRepo::new(&[s1.clone()]).with_collisions(2);
    let detail = CreateWorkOrderUseCase {
        shops: MockShopRepo::new(vec![s1.clone()]),
        work_orders: orders.clone(),
    }
    .execute(&actor(RoleCode::Admin, Some(&s1)), intake(None))
    .await
    .unwrap();

    let attempts = orders.attempted_codes.lock().unwrap().clone();
    assert_eq!(attempts.len(), 3);
    assert_eq!(attempts.last(), Some(&detail.code));
}

#[tokio::test]
async fn should_give_up_after_repeated_collisions() {
    let s1 = test_shop("S1");
    let orders = MockWorkOrderRepo::new(&[s1.clone()]).with_collisions(10);
    let err = CreateWorkOrderUseCase {
        shops: MockShopRepo::new(vec![s1.clone()]),
        work_orders: orders.clone(),
    }
    .execute(&actor(RoleCode::Admin, Some(&s1)), intake(None))
    .await
    .unwrap_err();

    assert!(matches!(err, DashboardError::WorkOrderAlreadyExists), "got {err:?}");
    assert_eq!(orders.attempted_codes.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn should_validate_intake_records() {
    let s1 = test_shop("S1");
    let create = CreateWorkOrderUseCase {
        shops: MockShopRepo::new(vec![s1.clone()]),
        work_orders: MockWorkOrderRepo::new(&[s1.clone()]),
    };
    let staff = actor(RoleCode::Adjuster, Some(&s1));

    let mut bad_email = intake(None);
    bad_email.customer.email = "jane".into();
    let err = create.execute(&staff, bad_email).await.unwrap_err();
    assert_eq!(err.field(), Some("customer.email"));

    let mut bad_vin = intake(None);
    bad_vin.vehicle.vin = Some("IOQ".into());
    let err = create.execute(&staff, bad_vin).await.unwrap_err();
    assert_eq!(err.field(), Some("vehicle.vin"));

    let mut bad_agent = intake(None);
    if let Some(ins) = bad_agent.insurance.as_mut() {
        ins.agent_phone = Some("7805550110".into());
    }
    let err = create.execute(&staff, bad_agent).await.unwrap_err();
    assert_eq!(err.field(), Some("insurance.agentPhone"));
}

// ── ListWorkOrders / GetWorkOrder ────────────────────────────────────────────

#[tokio::test]
async fn should_scope_listing_to_actors_shop() {
    let (s1, s2) = (test_shop("S1"), test_shop("S2"));
    let orders = MockWorkOrderRepo::new(&[s1.clone(), s2.clone()]);
    seed_order(&orders, &s1, "WO-AAAA1111");
    seed_order(&orders, &s1, "WO-AAAA2222");
    seed_order(&orders, &s2, "WO-BBBB1111");
    let list = ListWorkOrdersUseCase {
        work_orders: orders,
    };

    let mine = list
        .execute(&actor(RoleCode::Bodyman, Some(&s1)), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|o| o.shop.id == s1.id));
    assert_eq!(mine[0].customer_full_name, "Jane Doe");

    let all = list
        .execute(&actor(RoleCode::SuperAdmin, None), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let err = list
        .execute(&actor(RoleCode::Admin, None), PageRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::NoShopAssignment));
}

#[tokio::test]
async fn should_report_other_shops_order_as_missing() {
    let (s1, s2) = (test_shop("S1"), test_shop("S2"));
    let orders = MockWorkOrderRepo::new(&[s1.clone(), s2.clone()]);
    seed_order(&orders, &s2, "WO-BBBB1111");
    let get = GetWorkOrderUseCase {
        work_orders: orders,
    };

    let err = get
        .execute(&actor(RoleCode::Adjuster, Some(&s1)), "WO-BBBB1111")
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::WorkOrderNotFound));

    let detail = get
        .execute(&actor(RoleCode::Adjuster, Some(&s2)), " wo-bbbb1111 ")
        .await
        .unwrap();
    assert_eq!(detail.code, "WO-BBBB1111");
}
