pub mod oslo_market;
