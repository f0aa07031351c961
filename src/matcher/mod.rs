mod params;
mod resolver;

pub(crate) use resolver::find_route;
