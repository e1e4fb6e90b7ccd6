mod presenter;
