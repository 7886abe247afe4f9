//! Mediator wiring for every shop request and event.

use mediator::{DispatchError, Mediator, MediatorError, Request};

use crate::categories::{
    CreateCategory, CreateCategoryHandler, GetCategory, GetCategoryHandler, ListCategories,
    ListCategoriesHandler, create_category_validator,
};
use crate::context::ShopContext;
use crate::events::{ShipmentDelivered, ShipmentDispatched};
use crate::identity::{
    AuthenticateUser, IdentityHandlers, RegisterUser, SeedAdmin, authenticate_user_validator,
    register_user_validator, seed_admin_validator,
};
use crate::orders::{GetOrder, OrderHandlers, PlaceOrder, place_order_validator};
use crate::products::{
    CreateProduct, DeleteProduct, GetAllProducts, GetProductById, GetProductsByCategory,
    ProductHandlers, UpdateProduct, create_product_validator, get_all_products_validator,
    get_products_by_category_validator, update_product_validator,
};
use crate::shipments::{
    CompleteOrderOnDelivery, CreateShipment, DeliverShipment, DepleteStockOnDispatch,
    DispatchShipment, GetShipment, ShipmentHandlers,
};

/// Registers every handler, validator and event subscriber over `context`.
pub fn build_mediator(context: &ShopContext) -> Result<Mediator, MediatorError> {
    let products = ProductHandlers::new(context.clone());
    let identity = IdentityHandlers::new(context.clone());
    let orders = OrderHandlers::new(context.clone());
    let shipments = ShipmentHandlers::new(context.clone());

    Mediator::builder()
        // catalog
        .handler::<CreateCategory, _>(CreateCategoryHandler::new(context.clone()))
        .validator(create_category_validator())
        .handler::<GetCategory, _>(GetCategoryHandler::new(context.clone()))
        .handler::<ListCategories, _>(ListCategoriesHandler::new(context.clone()))
        .handler::<GetProductById, _>(products.clone())
        .handler::<GetAllProducts, _>(products.clone())
        .validator(get_all_products_validator())
        .handler::<GetProductsByCategory, _>(products.clone())
        .validator(get_products_by_category_validator())
        .handler::<CreateProduct, _>(products.clone())
        .validator(create_product_validator())
        .handler::<UpdateProduct, _>(products.clone())
        .validator(update_product_validator())
        .handler::<DeleteProduct, _>(products)
        // identity
        .handler::<RegisterUser, _>(identity.clone())
        .validator(register_user_validator())
        .handler::<AuthenticateUser, _>(identity.clone())
        .validator(authenticate_user_validator())
        .handler::<SeedAdmin, _>(identity)
        .validator(seed_admin_validator())
        // orders and shipments
        .handler::<PlaceOrder, _>(orders.clone())
        .validator(place_order_validator())
        .handler::<GetOrder, _>(orders)
        .handler::<CreateShipment, _>(shipments.clone())
        .handler::<GetShipment, _>(shipments.clone())
        .handler::<DispatchShipment, _>(shipments.clone())
        .handler::<DeliverShipment, _>(shipments)
        // domain events
        .notification_handler::<ShipmentDispatched, _>(DepleteStockOnDispatch::new(
            context.clone(),
        ))
        .notification_handler::<ShipmentDelivered, _>(CompleteOrderOnDelivery::new(
            context.clone(),
        ))
        .build()
}

fn wired<R: Request>(mediator: &Mediator) -> Result<(), DispatchError> {
    if mediator.handles::<R>() {
        Ok(())
    } else {
        Err(DispatchError::NoHandler(R::NAME))
    }
}

/// Startup check that every request type the API sends resolves.
pub fn verify_wiring(mediator: &Mediator) -> Result<(), DispatchError> {
    wired::<CreateCategory>(mediator)?;
    wired::<GetCategory>(mediator)?;
    wired::<ListCategories>(mediator)?;
    wired::<GetProductById>(mediator)?;
    wired::<GetAllProducts>(mediator)?;
    wired::<GetProductsByCategory>(mediator)?;
    wired::<CreateProduct>(mediator)?;
    wired::<UpdateProduct>(mediator)?;
    wired::<DeleteProduct>(mediator)?;
    wired::<RegisterUser>(mediator)?;
    wired::<AuthenticateUser>(mediator)?;
    wired::<SeedAdmin>(mediator)?;
    wired::<PlaceOrder>(mediator)?;
    wired::<GetOrder>(mediator)?;
    wired::<CreateShipment>(mediator)?;
    wired::<GetShipment>(mediator)?;
    wired::<DispatchShipment>(mediator)?;
    wired::<DeliverShipment>(mediator)
}
