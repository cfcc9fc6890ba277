pub(crate) mod wait_list;
