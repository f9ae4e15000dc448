//! Shared builders for repository integration tests.

#![allow(dead_code)]

use crm_core::types::DbId;
use crm_db::models::account::CreateAccount;
use crm_db::models::activity::{ActivityType, CreateActivity};
use crm_db::models::contact::CreateContact;
use crm_db::models::deal::{CreateDeal, DealStage};

pub fn new_account(name: &str) -> CreateAccount {
    CreateAccount {
        name: name.to_string(),
        industry: None,
        website: None,
        phone: None,
    }
}

pub fn new_contact(account_id: DbId, first: &str, last: &str) -> CreateContact {
    CreateContact {
        account_id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: None,
        phone: None,
        title: None,
    }
}

pub fn new_deal(account_id: DbId, name: &str) -> CreateDeal {
    CreateDeal {
        account_id,
        name: name.to_string(),
        stage: DealStage::Lead,
        amount: None,
        close_date: None,
    }
}

fn new_activity(subject: &str) -> CreateActivity {
    CreateActivity {
        activity_type: ActivityType::Note,
        subject: subject.to_string(),
        body: None,
        status: None,
        due_date: None,
        account_id: None,
        contact_id: None,
        deal_id: None,
    }
}

pub fn new_activity_for_account(account_id: DbId, subject: &str) -> CreateActivity {
    CreateActivity {
        account_id: Some(account_id),
        ..new_activity(subject)
    }
}

pub fn new_activity_for_contact(contact_id: DbId, subject: &str) -> CreateActivity {
    CreateActivity {
        contact_id: Some(contact_id),
        ..new_activity(subject)
    }
}

pub fn new_activity_for_deal(deal_id: DbId, subject: &str) -> CreateActivity {
    CreateActivity {
        deal_id: Some(deal_id),
        ..new_activity(subject)
    }
}
