pub mod fixtures;

#[cfg(test)]
mod auth_tests;
#[cfg(test)]
mod notification_tests;
#[cfg(test)]
mod post_tests;
#[cfg(test)]
mod reaction_tests;
#[cfg(test)]
mod user_tests;
