use super::Entity;
use crate::domain::{Order, Product};

impl Entity for Product {
    type Id = String;
    const KIND: &'static str = "product";

    fn id(&self) -> &String {
        &self.id
    }
}

impl Entity for Order {
    type Id = String;
    const KIND: &'static str = "order";

    fn id(&self) -> &String {
        &self.id
    }
}
