mod helpers;

mod cart;
mod checkout;
mod orders;
